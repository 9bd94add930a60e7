//! Configuration settings for Plandigest.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub inputs: InputSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub answer: AnswerSettings,
    pub batch: BatchSettings,
    pub interactive: InteractiveSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for staged documents.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir()
                .join("plandigest")
                .to_string_lossy()
                .to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Static inputs shared by every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// System prompt file. Must contain `context_placeholder`.
    pub prompt_file: String,
    /// Questions file, one question per non-blank line.
    pub questions_file: String,
    /// Token in the system prompt replaced by the retrieved context.
    pub context_placeholder: String,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            prompt_file: "summary_tool_system_prompt.md".to_string(),
            questions_file: "summary_tool_questions.md".to_string(),
            context_placeholder: "{context}".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-large".to_string(),
            dimensions: 3072,
        }
    }
}

/// Text chunking settings. Both values are in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 3000,
            chunk_overlap: 500,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Drop chunks scoring below this cosine similarity.
    pub min_score: Option<f32>,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 10,
            min_score: None,
        }
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerSettings {
    /// LLM model for answer generation.
    pub model: String,
    pub temperature: f32,
    /// Per-request timeout for API calls.
    pub request_timeout_secs: u64,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            request_timeout_secs: crate::openai::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Batch (directory) mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Directory receiving one summary per input PDF.
    pub output_dir: String,
    /// Appended to the input file stem to name the summary.
    pub output_suffix: String,
    /// Unwrap answers that are a single fenced code block.
    pub strip_code_fences: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            output_dir: "CAPS_Summaries".to_string(),
            output_suffix: "_Summary.md".to_string(),
            strip_code_fences: false,
        }
    }
}

/// Interactive (web) mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveSettings {
    pub host: String,
    pub port: u16,
    /// Page title.
    pub title: String,
    /// File name offered for the downloaded result.
    pub download_file_name: String,
    /// Unwrap answers that are a single fenced code block.
    pub strip_code_fences: bool,
    /// PDFs indexed together with every upload.
    pub shared_documents: Vec<String>,
    /// Maximum accepted request body size.
    pub max_upload_bytes: usize,
}

impl Default for InteractiveSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            title: "Climate Policy Summary Tool".to_string(),
            download_file_name: "qa_results.md".to_string(),
            strip_code_fences: true,
            shared_documents: Vec::new(),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings: Settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Reject combinations that cannot produce a working pipeline.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::DigestError;

        if self.chunking.chunk_size == 0 {
            return Err(DigestError::Config("chunking.chunk_size must be positive".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(DigestError::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(DigestError::Config("retrieval.top_k must be positive".to_string()));
        }
        if self.inputs.context_placeholder.is_empty() {
            return Err(DigestError::Config(
                "inputs.context_placeholder must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::DigestError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("plandigest")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded system prompt path.
    pub fn prompt_path(&self) -> PathBuf {
        Self::expand_path(&self.inputs.prompt_file)
    }

    /// Get the expanded questions path.
    pub fn questions_path(&self) -> PathBuf {
        Self::expand_path(&self.inputs.questions_file)
    }

    /// Get the expanded batch output directory.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.batch.output_dir)
    }

    /// Get the expanded shared document paths.
    pub fn shared_documents(&self) -> Vec<PathBuf> {
        self.interactive
            .shared_documents
            .iter()
            .map(|p| Self::expand_path(p))
            .collect()
    }
}
