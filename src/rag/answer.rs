//! Answer generation over retrieved context.

use super::context::{format_context_for_prompt, ContextBuilder};
use super::fence::FenceStripper;
use crate::config::SystemPrompt;
use crate::error::Result;
use crate::generation::ChatModel;
use crate::vector_store::SearchResult;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// An answer with the chunks it was generated from.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SearchResult>,
}

/// Answers questions against one document index.
pub struct Answerer {
    context_builder: ContextBuilder,
    chat: Arc<dyn ChatModel>,
    prompt: SystemPrompt,
    fence_stripper: Option<FenceStripper>,
}

impl Answerer {
    pub fn new(
        context_builder: ContextBuilder,
        chat: Arc<dyn ChatModel>,
        prompt: SystemPrompt,
    ) -> Self {
        Self {
            context_builder,
            chat,
            prompt,
            fence_stripper: None,
        }
    }

    /// Unwrap answers that are a single fenced code block.
    pub fn with_fence_stripping(mut self, enabled: bool) -> Self {
        self.fence_stripper = enabled.then(FenceStripper::new);
        self
    }

    /// Retrieve context for `question` and generate an answer.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        info!("Answering: {}", question);

        let sources = self.context_builder.build(question).await?;
        debug!("Retrieved {} context chunks", sources.len());

        let system = self.prompt.render(&format_context_for_prompt(&sources));
        let raw = self.chat.complete(&system, question).await?;

        let text = match &self.fence_stripper {
            Some(stripper) => stripper.strip(&raw),
            None => raw,
        };

        Ok(Answer { text, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::TextChunk;
    use crate::embedding::Embedder;
    use crate::test_support::{EchoChatModel, HashEmbedder};
    use crate::vector_store::{IndexedChunk, MemoryVectorStore, VectorStore};

    async fn answerer(chat: Arc<EchoChatModel>, strip: bool) -> Answerer {
        let embedder = Arc::new(HashEmbedder::new());
        let store = Arc::new(MemoryVectorStore::new());
        let text = "The plan cuts emissions 40 percent by 2030".to_string();
        let embedding = embedder.embed(&text).await.unwrap();
        store
            .insert_batch(vec![IndexedChunk {
                chunk: TextChunk {
                    content: text,
                    source: "plan.pdf".to_string(),
                    page_number: 1,
                    order: 0,
                },
                embedding,
            }])
            .await
            .unwrap();

        let prompt = SystemPrompt::new("Context:\n{context}", "{context}").unwrap();
        Answerer::new(ContextBuilder::new(store, embedder), chat, prompt)
            .with_fence_stripping(strip)
    }

    #[tokio::test]
    async fn test_context_is_injected_into_system_prompt() {
        let chat = Arc::new(EchoChatModel::new());
        let answerer = answerer(chat.clone(), false).await;

        let answer = answerer.answer("What is the 2030 target?").await.unwrap();

        let calls = chat.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Context:\nThe plan cuts emissions 40 percent by 2030");
        assert_eq!(calls[0].1, "What is the 2030 target?");
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.text, "Answer to: What is the 2030 target?");
    }

    #[tokio::test]
    async fn test_fence_stripping_is_optional() {
        let fenced = "```markdown\n40 percent\n```";

        let chat = Arc::new(EchoChatModel::with_reply(fenced));
        let kept = answerer(chat, false).await.answer("q").await.unwrap();
        assert_eq!(kept.text, fenced);

        let chat = Arc::new(EchoChatModel::with_reply(fenced));
        let stripped = answerer(chat, true).await.answer("q").await.unwrap();
        assert_eq!(stripped.text, "40 percent");
    }
}
