//! Deterministic stand-ins for the network-backed components.

use crate::config::Settings;
use crate::document::{DocumentLoader, PageText, StagedDocument};
use crate::embedding::Embedder;
use crate::error::{DigestError, Result};
use crate::generation::ChatModel;
use crate::report::{QaResult, Report, ReportSink};
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const HASH_DIMENSIONS: usize = 256;

/// Bag-of-words embedder: each lowercase word hashes into one of 256 buckets.
#[derive(Default)]
pub struct HashEmbedder {
    calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `embed`/`embed_batch` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; HASH_DIMENSIONS];
        for word in text.split_whitespace() {
            let word = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if word.is_empty() {
                continue;
            }
            let mut hash: u64 = 0xcbf29ce484222325;
            for byte in word.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(0x100000001b3);
            }
            vector[(hash % HASH_DIMENSIONS as u64) as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        HASH_DIMENSIONS
    }
}

/// Chat model that records every call and replies without a network.
#[derive(Default)]
pub struct EchoChatModel {
    reply: Option<String>,
    fail_after: Option<usize>,
    calls: Mutex<Vec<(String, String)>>,
}

impl EchoChatModel {
    /// Replies "Answer to: {user}".
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Self::default()
        }
    }

    /// Succeeds `n` times, then returns generation errors.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }

    /// Recorded `(system, user)` pairs.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for EchoChatModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((system.to_string(), user.to_string()));
            calls.len()
        };

        if self.fail_after.is_some_and(|n| count > n) {
            return Err(DigestError::Generation("model unavailable".to_string()));
        }

        Ok(match &self.reply {
            Some(reply) => reply.clone(),
            None => format!("Answer to: {}", user),
        })
    }

    fn model(&self) -> &str {
        "echo"
    }
}

/// Treats the staged file as UTF-8 text with form feeds between pages.
///
/// Content containing `CORRUPT` fails to load.
pub struct FakePdfLoader;

#[async_trait]
impl DocumentLoader for FakePdfLoader {
    async fn load(&self, document: &StagedDocument) -> Result<Vec<PageText>> {
        let bytes = tokio::fs::read(document.path()).await?;
        let text = String::from_utf8_lossy(&bytes);

        if text.contains("CORRUPT") {
            return Err(DigestError::Document(format!(
                "Failed to parse {}",
                document.name()
            )));
        }

        Ok(text
            .split('\x0c')
            .enumerate()
            .map(|(i, page)| PageText::new(document.name(), i as u32 + 1, page))
            .collect())
    }
}

/// Records what a run reported.
#[derive(Default)]
pub struct CollectingSink {
    pub seen: usize,
    pub finished: bool,
    pub results: Vec<QaResult>,
}

#[async_trait]
impl ReportSink for CollectingSink {
    async fn on_result(&mut self, result: &QaResult, _report: &Report) -> Result<()> {
        self.seen += 1;
        self.results.push(result.clone());
        Ok(())
    }

    async fn finish(&mut self, _report: &Report) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

/// Write a prompt and question file under `dir` and return settings that
/// point at them, with temp and output directories also under `dir`.
pub fn write_inputs(dir: &Path, prompt: &str, questions: &str) -> Settings {
    let prompt_path = dir.join("prompt.md");
    let questions_path = dir.join("questions.md");
    std::fs::write(&prompt_path, prompt).unwrap();
    std::fs::write(&questions_path, questions).unwrap();

    let mut settings = Settings::default();
    settings.inputs.prompt_file = prompt_path.to_string_lossy().to_string();
    settings.inputs.questions_file = questions_path.to_string_lossy().to_string();
    settings.general.temp_dir = dir.join("tmp").to_string_lossy().to_string();
    settings.batch.output_dir = dir.join("out").to_string_lossy().to_string();
    settings
}
