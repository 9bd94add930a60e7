//! Retrieval-augmented question answering.
//!
//! Retrieves the chunks closest to a question from a document index and asks
//! the chat model to answer from them.

mod answer;
pub mod context;
mod fence;

pub use answer::{Answer, Answerer};
pub use context::ContextBuilder;
pub use fence::FenceStripper;
