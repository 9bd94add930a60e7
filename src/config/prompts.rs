//! Static run inputs: the system prompt template and the question list.
//!
//! Both are read once per run from plain Markdown files. A missing file is a
//! hard error so a run fails before any document is touched.

use crate::error::{DigestError, Result};
use std::path::Path;

/// Default system prompt written by `plandigest init`.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an analyst summarizing a policy plan for a reader who has not seen it.

Answer the user's question using only the excerpts from the plan below.

Guidelines:
- Quote figures, dates and targets exactly as written in the plan
- If the excerpts do not contain the answer, say that the plan does not address it
- Keep answers concise and use bullet points for lists
- Do not wrap the answer in a code block

Excerpts from the plan:

{context}"#;

/// Default questions written by `plandigest init`.
pub const DEFAULT_QUESTIONS: &str = "What is the name and publication year of the plan?
Which jurisdiction or organization adopted the plan?
What are the plan's stated goals?
Which emission reduction targets does the plan set, and by when?
Which sectors does the plan address?
How will progress be monitored and reported?
";

/// The system prompt, with a placeholder for retrieved context.
#[derive(Debug, Clone)]
pub struct SystemPrompt {
    template: String,
    placeholder: String,
}

impl SystemPrompt {
    /// Build a prompt from a template string. The template must contain `placeholder`.
    pub fn new(template: impl Into<String>, placeholder: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let placeholder = placeholder.into();

        if !template.contains(&placeholder) {
            return Err(DigestError::Config(format!(
                "System prompt does not contain the context placeholder {}",
                placeholder
            )));
        }

        Ok(Self {
            template,
            placeholder,
        })
    }

    /// Read a prompt template from disk.
    pub fn load(path: &Path, placeholder: &str) -> Result<Self> {
        if !path.exists() {
            return Err(DigestError::NotFound(path.to_path_buf()));
        }
        let template = std::fs::read_to_string(path)?;
        Self::new(template, placeholder)
    }

    /// Substitute `context` for every occurrence of the placeholder.
    pub fn render(&self, context: &str) -> String {
        self.template.replace(&self.placeholder, context)
    }
}

/// Ordered, immutable list of questions.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionList {
    questions: Vec<String>,
}

impl QuestionList {
    /// Parse one question per line; lines are trimmed and blank lines skipped.
    pub fn parse(content: &str) -> Self {
        let questions = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { questions }
    }

    /// Read a question list from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DigestError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompt_has_placeholder() {
        assert!(SystemPrompt::new(DEFAULT_SYSTEM_PROMPT, "{context}").is_ok());
        assert!(!QuestionList::parse(DEFAULT_QUESTIONS).is_empty());
    }

    #[test]
    fn test_prompt_without_placeholder_rejected() {
        let err = SystemPrompt::new("Answer the question.", "{context}").unwrap_err();
        assert!(matches!(err, DigestError::Config(_)));
    }

    #[test]
    fn test_render_replaces_every_placeholder() {
        let prompt = SystemPrompt::new("A {context} B {context}", "{context}").unwrap();
        assert_eq!(prompt.render("x"), "A x B x");
    }

    #[test]
    fn test_questions_skip_blank_lines_and_trim() {
        let questions = QuestionList::parse("  First?  \n\n\t\nSecond?\r\n   \nThird?");
        let parsed: Vec<&str> = questions.iter().collect();
        assert_eq!(parsed, vec!["First?", "Second?", "Third?"]);
    }

    #[test]
    fn test_missing_files_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.md");

        assert!(matches!(
            SystemPrompt::load(&missing, "{context}"),
            Err(DigestError::NotFound(_))
        ));
        assert!(matches!(QuestionList::load(&missing), Err(DigestError::NotFound(_))));
    }
}
