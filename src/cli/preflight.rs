//! Pre-flight checks before expensive operations.
//!
//! Validates that the prompt, questions and shared documents are in place
//! before any document is staged or any API call is made.

use crate::config::Settings;
use crate::error::{DigestError, Result};
use crate::pipeline::Pipeline;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Batch runs need the prompt and at least one question.
    Batch,
    /// The web front end also needs every shared document.
    Serve,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Batch => {
            check_inputs(settings)?;
        }
        Operation::Serve => {
            check_inputs(settings)?;
            check_shared_documents(settings)?;
        }
    }
    Ok(())
}

/// Check that the prompt and question files load, returning the question count.
pub fn check_inputs(settings: &Settings) -> Result<usize> {
    let (_, questions) = Pipeline::load_inputs(settings)?;
    if questions.is_empty() {
        return Err(DigestError::Config(format!(
            "{} contains no questions",
            settings.questions_path().display()
        )));
    }
    Ok(questions.len())
}

/// Check that every configured shared document exists.
pub fn check_shared_documents(settings: &Settings) -> Result<()> {
    for path in settings.shared_documents() {
        if !path.is_file() {
            return Err(DigestError::NotFound(path));
        }
    }
    Ok(())
}
