//! Question/answer results and their Markdown rendering.

mod sink;

pub use sink::{ChannelSink, FileSink, ReportSink};

/// One answered question.
#[derive(Debug, Clone, PartialEq)]
pub struct QaResult {
    pub question: String,
    pub answer: String,
}

impl QaResult {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Render as a Markdown block ending in a newline.
    pub fn format(&self) -> String {
        format!("### Question: {}\n**Answer:**\n{}\n", self.question, self.answer)
    }
}

/// Ordered collection of results for one run.
#[derive(Debug, Clone, Default)]
pub struct Report {
    results: Vec<QaResult>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: QaResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[QaResult] {
        &self.results
    }

    /// The full artifact: formatted blocks in order, separated by blank lines.
    pub fn to_markdown(&self) -> String {
        self.results
            .iter()
            .map(QaResult::format)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_block() {
        let result = QaResult::new("What is the goal?", "Net zero by 2045.");
        assert_eq!(
            result.format(),
            "### Question: What is the goal?\n**Answer:**\nNet zero by 2045.\n"
        );
    }

    #[test]
    fn test_markdown_keeps_order_with_blank_line_separators() {
        let mut report = Report::new();
        report.push(QaResult::new("First?", "A"));
        report.push(QaResult::new("Second?", "B"));

        assert_eq!(
            report.to_markdown(),
            "### Question: First?\n**Answer:**\nA\n\n### Question: Second?\n**Answer:**\nB\n"
        );
    }

    #[test]
    fn test_empty_report_renders_empty() {
        assert_eq!(Report::new().to_markdown(), "");
    }
}
