//! Error types for Plandigest.

use std::path::PathBuf;
use thiserror::Error;

/// Library-level error type for Plandigest operations.
#[derive(Error, Debug)]
pub enum DigestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("The specified file was not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Plandigest operations.
pub type Result<T> = std::result::Result<T, DigestError>;
