//! Destinations for results as a run progresses.

use super::{QaResult, Report};
use crate::error::{DigestError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::debug;

/// Receives results while a run progresses.
#[async_trait]
pub trait ReportSink: Send {
    /// Called after each question is answered. `report` already contains `result`.
    async fn on_result(&mut self, result: &QaResult, report: &Report) -> Result<()>;

    /// Called once after every question has been answered.
    async fn finish(&mut self, report: &Report) -> Result<()>;
}

/// Writes the whole report to a file once the run completes.
///
/// Nothing is written if the run fails part-way.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportSink for FileSink {
    async fn on_result(&mut self, _result: &QaResult, report: &Report) -> Result<()> {
        debug!("{} answers pending for {}", report.len(), self.path.display());
        Ok(())
    }

    async fn finish(&mut self, report: &Report) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, report.to_markdown()).await?;
        Ok(())
    }
}

/// Streams each formatted block as soon as it is available.
///
/// Concatenating everything sent equals `Report::to_markdown()`.
pub struct ChannelSink {
    tx: mpsc::Sender<String>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl ReportSink for ChannelSink {
    async fn on_result(&mut self, result: &QaResult, report: &Report) -> Result<()> {
        let block = if report.len() > 1 {
            format!("\n{}", result.format())
        } else {
            result.format()
        };

        self.tx.send(block).await.map_err(|_| {
            DigestError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "result receiver closed",
            ))
        })
    }

    async fn finish(&mut self, _report: &Report) -> Result<()> {
        Ok(())
    }
}
