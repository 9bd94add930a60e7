//! Removal of code-fence framing around model answers.

use regex::Regex;

/// Unwraps answers that consist of exactly one fenced code block.
///
/// Anything else (plain text, a fence that does not span the whole answer,
/// or several fenced blocks) is returned unchanged.
pub struct FenceStripper {
    pattern: Regex,
}

impl FenceStripper {
    pub fn new() -> Self {
        // Opening fence with optional language tag, body, closing fence, optional final newline.
        let pattern = Regex::new(r"(?s)\A```(?:\w+)?\n(.*?)\n```\n?\z").expect("Invalid regex");
        Self { pattern }
    }

    pub fn strip(&self, text: &str) -> String {
        let Some(body) = self.pattern.captures(text).and_then(|caps| caps.get(1)) else {
            return text.to_string();
        };

        if body
            .as_str()
            .lines()
            .any(|line| line.trim_start().starts_with("```"))
        {
            return text.to_string();
        }

        body.as_str().trim().to_string()
    }
}

impl Default for FenceStripper {
    fn default() -> Self {
        Self::new()
    }
}
