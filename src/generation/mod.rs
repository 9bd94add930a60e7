//! Text generation with a chat-completion model.

mod openai;

pub use openai::OpenAIChatModel;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for chat-completion backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a reply to `user` under the `system` instructions.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}
