//! Document loading: staging input PDFs and extracting page text.

mod pdf;
mod staging;

pub use pdf::PdfLoader;
pub use staging::StagedDocument;

use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Where a document comes from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// A PDF on the local filesystem.
    Path(PathBuf),
    /// PDF bytes received from a client.
    Upload { file_name: String, bytes: Vec<u8> },
}

impl DocumentSource {
    /// Name used in logs and chunk provenance.
    pub fn display_name(&self) -> String {
        match self {
            DocumentSource::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            DocumentSource::Upload { file_name, .. } => file_name.clone(),
        }
    }
}

/// Text extracted from one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    /// Name of the document the page belongs to.
    pub source: String,
    /// 1-based page number.
    pub page_number: u32,
    pub text: String,
}

impl PageText {
    pub fn new(source: impl Into<String>, page_number: u32, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            page_number,
            text: text.into(),
        }
    }
}

/// Trait for turning a staged document into ordered page text.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, document: &StagedDocument) -> Result<Vec<PageText>>;
}
