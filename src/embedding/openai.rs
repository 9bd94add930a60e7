//! OpenAI embeddings implementation.

use super::Embedder;
use crate::error::{DigestError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Texts sent per embeddings request.
const BATCH_SIZE: usize = 100;

/// OpenAI-based embedder.
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Create an embedder with the default model (`text-embedding-3-large`, 3072 dimensions).
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self::with_config(client, "text-embedding-3-large", 3072)
    }

    /// Create an embedder with a custom model and dimensions.
    pub fn with_config(client: Client<OpenAIConfig>, model: &str, dimensions: usize) -> Self {
        Self {
            client,
            model: model.to_string(),
            dimensions,
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| DigestError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(BATCH_SIZE) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(batch.to_vec()))
                .dimensions(self.dimensions as u32)
                .build()
                .map_err(|e| DigestError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| DigestError::OpenAI(format!("Embedding API error: {}", e)))?;

            if response.data.len() != batch.len() {
                return Err(DigestError::Embedding(format!(
                    "Expected {} embeddings, received {}",
                    batch.len(),
                    response.data.len()
                )));
            }

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            all_embeddings.extend(embeddings.into_iter().map(|e| e.embedding));
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::{create_client, ApiCredential};

    #[test]
    fn test_embedder_creation() {
        let credential = ApiCredential::new("sk-test").unwrap();

        let embedder = OpenAIEmbedder::new(create_client(&credential).unwrap());
        assert_eq!(embedder.dimensions(), 3072);

        let embedder = OpenAIEmbedder::with_config(
            create_client(&credential).unwrap(),
            "text-embedding-3-small",
            1536,
        );
        assert_eq!(embedder.dimensions(), 1536);
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let credential = ApiCredential::new("sk-test").unwrap();
        let embedder = OpenAIEmbedder::new(create_client(&credential).unwrap());
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
    }
}
