//! Configuration module for Plandigest.
//!
//! Handles loading application settings and the per-run prompt and question files.

mod prompts;
mod settings;

pub use prompts::{QuestionList, SystemPrompt, DEFAULT_QUESTIONS, DEFAULT_SYSTEM_PROMPT};
pub use settings::{
    AnswerSettings, BatchSettings, ChunkingSettings, EmbeddingSettings, GeneralSettings,
    InputSettings, InteractiveSettings, RetrievalSettings, Settings,
};
