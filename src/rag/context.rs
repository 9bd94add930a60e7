//! Context retrieval for question answering.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{SearchResult, VectorStore};
use std::sync::Arc;

/// Retrieves the chunks most similar to a question.
pub struct ContextBuilder {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    max_chunks: usize,
    min_score: Option<f32>,
}

impl ContextBuilder {
    /// Create a new context builder returning the top 10 chunks.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            max_chunks: 10,
            min_score: None,
        }
    }

    /// Set the maximum number of context chunks.
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Set a minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: Option<f32>) -> Self {
        self.min_score = min_score;
        self
    }

    /// Retrieve context for a query.
    pub async fn build(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedder.embed(query).await?;

        match self.min_score {
            Some(min_score) => {
                self.vector_store
                    .search_with_threshold(&query_embedding, self.max_chunks, min_score)
                    .await
            }
            None => self.vector_store.search(&query_embedding, self.max_chunks).await,
        }
    }
}

/// Join retrieved chunk texts for insertion into the system prompt.
pub fn format_context_for_prompt(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
