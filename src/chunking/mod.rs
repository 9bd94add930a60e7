//! Text chunking for embedding.
//!
//! Splits extracted page text into overlapping windows sized for the
//! embedding model.

mod recursive;

pub use recursive::RecursiveSplitter;

use crate::config::ChunkingSettings;
use crate::document::PageText;
use crate::error::{DigestError, Result};

/// A contiguous span of document text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Name of the source document.
    pub source: String,
    /// Page the chunk was cut from.
    pub page_number: u32,
    /// Position of this chunk in the document set.
    pub order: usize,
}

/// Configuration for chunking. Sizes are in characters.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(DigestError::Config(format!(
                "Invalid chunking window: size {} with overlap {}",
                self.chunk_size, self.chunk_overlap
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 3000,
            chunk_overlap: 500,
        }
    }
}

impl From<&ChunkingSettings> for ChunkingConfig {
    fn from(settings: &ChunkingSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
        }
    }
}

/// Trait for content chunking implementations.
pub trait Chunker: Send + Sync {
    /// Split pages into ordered chunks.
    fn chunk(&self, pages: &[PageText], config: &ChunkingConfig) -> Result<Vec<TextChunk>>;
}
