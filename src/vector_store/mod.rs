//! Vector index abstraction for Plandigest.
//!
//! Indexes live only for the duration of a single pipeline run.

mod memory;

pub use memory::MemoryVectorStore;

use crate::chunking::TextChunk;
use crate::error::Result;
use async_trait::async_trait;

/// A chunk paired with its embedding.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk: TextChunk,
    pub embedding: Vec<f32>,
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched chunk.
    pub chunk: TextChunk,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector index implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Add chunks with their embeddings.
    async fn insert_batch(&self, entries: Vec<IndexedChunk>) -> Result<usize>;

    /// Search for the most similar chunks.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Search with a minimum similarity threshold.
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Number of indexed chunks.
    async fn len(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
