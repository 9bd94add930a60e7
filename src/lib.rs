//! Plandigest - question answering over PDF documents
//!
//! Answers a fixed list of questions about PDF documents using
//! retrieval-augmented generation, producing a Markdown report.
//!
//! # Overview
//!
//! Plandigest runs in two ways:
//! - Interactively, as a local web page where a PDF is uploaded and answers
//!   stream back as they are generated
//! - In batch, over a directory of PDFs, writing one report per file
//!
//! # Architecture
//!
//! - `config` - Settings, system prompt and question list
//! - `document` - Document sources, staging and PDF text extraction
//! - `chunking` - Recursive character splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - In-memory similarity search
//! - `generation` - Chat completion
//! - `rag` - Context retrieval and answer generation
//! - `report` - Markdown rendering and result sinks
//! - `pipeline` - The end-to-end run
//! - `batch` - Directory processing
//!
//! # Example
//!
//! ```rust,no_run
//! use plandigest::config::Settings;
//! use plandigest::document::DocumentSource;
//! use plandigest::openai::ApiCredential;
//! use plandigest::pipeline::Pipeline;
//! use plandigest::report::FileSink;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let credential = ApiCredential::from_env()
//!         .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY is not set"))?;
//!     let pipeline = Pipeline::new(settings, &credential)?;
//!
//!     let source = DocumentSource::Path("plan.pdf".into());
//!     let mut sink = FileSink::new("plan_Summary.md");
//!     let report = pipeline.process(&[source], &mut sink).await?;
//!     println!("Answered {} questions", report.len());
//!
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod openai;
pub mod pipeline;
pub mod rag;
pub mod report;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{DigestError, Result};
