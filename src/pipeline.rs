//! The document question-answering pipeline.
//!
//! One run takes a set of documents through loading, chunking, indexing and
//! answering, handing every result to a [`ReportSink`]. Each run builds its
//! own index, so content never leaks between runs.

use crate::chunking::{Chunker, ChunkingConfig, RecursiveSplitter, TextChunk};
use crate::config::{QuestionList, Settings, SystemPrompt};
use crate::document::{DocumentLoader, DocumentSource, PdfLoader, StagedDocument};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{DigestError, Result};
use crate::generation::{ChatModel, OpenAIChatModel};
use crate::openai::{create_client_with_timeout, ApiCredential};
use crate::rag::{Answerer, ContextBuilder};
use crate::report::{QaResult, Report, ReportSink};
use crate::vector_store::{IndexedChunk, MemoryVectorStore, VectorStore};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Pipeline stage, for progress logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Chunking,
    Indexing,
    Answering,
    Writing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loading => "loading",
            Stage::Chunking => "chunking",
            Stage::Indexing => "indexing",
            Stage::Answering => "answering",
            Stage::Writing => "writing",
        };
        f.write_str(name)
    }
}

/// The question-answering pipeline.
pub struct Pipeline {
    settings: Settings,
    prompt: SystemPrompt,
    questions: QuestionList,
    loader: Arc<dyn DocumentLoader>,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatModel>,
    strip_code_fences: bool,
}

impl Pipeline {
    /// Create a pipeline backed by OpenAI, authenticated with `credential`.
    ///
    /// The prompt and question files are read before any client is built.
    pub fn new(settings: Settings, credential: &ApiCredential) -> Result<Self> {
        let (prompt, questions) = Self::load_inputs(&settings)?;

        let timeout = Duration::from_secs(settings.answer.request_timeout_secs);
        let client = create_client_with_timeout(credential, timeout)?;

        let embedder = Arc::new(OpenAIEmbedder::with_config(
            client.clone(),
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        let chat = Arc::new(OpenAIChatModel::with_config(
            client,
            &settings.answer.model,
            settings.answer.temperature,
        ));

        Ok(Self::with_components(
            settings,
            prompt,
            questions,
            Arc::new(PdfLoader::new()),
            embedder,
            chat,
        ))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        settings: Settings,
        prompt: SystemPrompt,
        questions: QuestionList,
        loader: Arc<dyn DocumentLoader>,
        embedder: Arc<dyn Embedder>,
        chat: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            settings,
            prompt,
            questions,
            loader,
            chunker: Arc::new(RecursiveSplitter::new()),
            embedder,
            chat,
            strip_code_fences: false,
        }
    }

    /// Read and validate the system prompt and question list named in `settings`.
    pub fn load_inputs(settings: &Settings) -> Result<(SystemPrompt, QuestionList)> {
        settings.validate()?;

        let prompt =
            SystemPrompt::load(&settings.prompt_path(), &settings.inputs.context_placeholder)?;
        let questions = QuestionList::load(&settings.questions_path())?;

        if questions.is_empty() {
            warn!(
                "Questions file {} has no questions",
                settings.questions_path().display()
            );
        }

        Ok((prompt, questions))
    }

    /// Unwrap answers that are a single fenced code block.
    pub fn with_fence_stripping(mut self, enabled: bool) -> Self {
        self.strip_code_fences = enabled;
        self
    }

    pub fn questions(&self) -> &QuestionList {
        &self.questions
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Answer every question against a fresh index built from `sources`.
    #[instrument(skip_all, fields(documents = sources.len()))]
    pub async fn process(
        &self,
        sources: &[DocumentSource],
        sink: &mut dyn ReportSink,
    ) -> Result<Report> {
        if sources.is_empty() {
            return Err(DigestError::InvalidInput("No documents to process".to_string()));
        }

        info!(stage = %Stage::Loading, "Loading {} document(s)", sources.len());
        let temp_dir = self.settings.temp_dir();
        let staged = sources
            .iter()
            .map(|source| StagedDocument::stage(source, &temp_dir))
            .collect::<Result<Vec<_>>>()?;

        let mut pages = Vec::new();
        for document in &staged {
            pages.extend(self.loader.load(document).await?);
        }
        drop(staged);
        debug!("Loaded {} pages", pages.len());

        info!(stage = %Stage::Chunking, "Splitting {} pages", pages.len());
        let chunks = self
            .chunker
            .chunk(&pages, &ChunkingConfig::from(&self.settings.chunking))?;
        if chunks.is_empty() {
            return Err(DigestError::Document("No text to index".to_string()));
        }

        info!(stage = %Stage::Indexing, "Embedding {} chunks", chunks.len());
        let store = self.build_index(chunks).await?;

        let context_builder = ContextBuilder::new(store, self.embedder.clone())
            .with_max_chunks(self.settings.retrieval.top_k)
            .with_min_score(self.settings.retrieval.min_score);
        let answerer = Answerer::new(context_builder, self.chat.clone(), self.prompt.clone())
            .with_fence_stripping(self.strip_code_fences);

        let total = self.questions.len();
        info!(
            stage = %Stage::Answering,
            "Answering {} questions with {}",
            total,
            self.chat.model()
        );
        let mut report = Report::new();
        for (i, question) in self.questions.iter().enumerate() {
            info!(stage = %Stage::Answering, "Question {}/{}", i + 1, total);
            let answer = answerer.answer(question).await?;

            let result = QaResult::new(question, answer.text);
            report.push(result.clone());
            sink.on_result(&result, &report).await?;
        }

        info!(stage = %Stage::Writing, "Writing {} answers", report.len());
        sink.finish(&report).await?;

        Ok(report)
    }

    async fn build_index(&self, chunks: Vec<TextChunk>) -> Result<Arc<dyn VectorStore>> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(DigestError::Embedding(format!(
                "Expected {} embeddings, received {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let expected = self.embedder.dimensions();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
            return Err(DigestError::Embedding(format!(
                "Expected {} dimensions, received {}",
                expected,
                bad.len()
            )));
        }

        let entries: Vec<IndexedChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();

        let store = MemoryVectorStore::new();
        let count = store.insert_batch(entries).await?;
        debug!("Indexed {} chunks", count);

        Ok(Arc::new(store))
    }
}
