//! In-memory vector index.
//!
//! Brute-force cosine search over an insertion-ordered list. Equal scores
//! keep insertion order, so the same chunks and embeddings always produce
//! the same results.

use super::{cosine_similarity, IndexedChunk, SearchResult, VectorStore};
use crate::error::{DigestError, Result};
use async_trait::async_trait;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    entries: RwLock<Vec<IndexedChunk>>,
}

impl MemoryVectorStore {
    /// Create a new, empty in-memory vector store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    fn poisoned() -> DigestError {
        DigestError::VectorStore("index lock poisoned".to_string())
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn insert_batch(&self, batch: Vec<IndexedChunk>) -> Result<usize> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;

        let expected = entries
            .first()
            .or_else(|| batch.first())
            .map(|e| e.embedding.len());
        if let Some(dim) = expected {
            if let Some(bad) = batch.iter().find(|e| e.embedding.len() != dim) {
                return Err(DigestError::VectorStore(format!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    dim,
                    bad.embedding.len()
                )));
            }
        }

        let count = batch.len();
        entries.extend(batch);
        Ok(count)
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;

        let mut results: Vec<SearchResult> = entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query_embedding, &entry.embedding),
            })
            .collect();

        // sort_by is stable: ties stay in insertion order
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let mut results = self.search(query_embedding, usize::MAX).await?;
        results.retain(|r| r.score >= min_score);
        results.truncate(limit);
        Ok(results)
    }

    async fn len(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::TextChunk;

    fn entry(content: &str, order: usize, embedding: Vec<f32>) -> IndexedChunk {
        IndexedChunk {
            chunk: TextChunk {
                content: content.to_string(),
                source: "plan.pdf".to_string(),
                page_number: 1,
                order,
            },
            embedding,
        }
    }

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        store
            .insert_batch(vec![
                entry("Hello world", 0, vec![1.0, 0.0, 0.0]),
                entry("Goodbye world", 1, vec![0.0, 1.0, 0.0]),
                entry("Hello again", 2, vec![0.9, 0.1, 0.0]),
            ])
            .await
            .unwrap();

        assert_eq!(store.len().await.unwrap(), 3);

        let results = store.search(&[1.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "Hello world");
        assert_eq!(results[1].chunk.content, "Hello again");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let store = MemoryVectorStore::new();
        store
            .insert_batch((0..5).map(|i| entry(&format!("c{}", i), i, vec![1.0, 1.0])).collect())
            .await
            .unwrap();

        let first = store.search(&[1.0, 1.0], 3).await.unwrap();
        let second = store.search(&[1.0, 1.0], 3).await.unwrap();
        let names: Vec<_> = first.iter().map(|r| r.chunk.content.as_str()).collect();
        assert_eq!(names, vec!["c0", "c1", "c2"]);
        let again: Vec<_> = second.iter().map(|r| r.chunk.content.as_str()).collect();
        assert_eq!(names, again);
    }

    #[tokio::test]
    async fn test_threshold_filters_low_scores() {
        let store = MemoryVectorStore::new();
        store
            .insert_batch(vec![
                entry("match", 0, vec![1.0, 0.0]),
                entry("orthogonal", 1, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = store.search_with_threshold(&[1.0, 0.0], 10, 0.5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.content, "match");
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let store = MemoryVectorStore::new();
        store.insert_batch(vec![entry("a", 0, vec![1.0, 0.0])]).await.unwrap();

        let err = store
            .insert_batch(vec![entry("b", 1, vec![1.0, 0.0, 0.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, DigestError::VectorStore(_)));
        assert_eq!(store.len().await.unwrap(), 1);
    }
}
