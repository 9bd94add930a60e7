//! Batch processing of a directory of PDFs.
//!
//! Each PDF gets its own run and its own Markdown report. A failing file is
//! reported and skipped; the rest of the batch carries on.

use crate::document::DocumentSource;
use crate::error::{DigestError, Result};
use crate::pipeline::Pipeline;
use crate::report::FileSink;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    Started {
        file: &'a Path,
        index: usize,
        total: usize,
    },
    Saved {
        file: &'a Path,
        output: &'a Path,
    },
    Failed {
        file: &'a Path,
        error: &'a DigestError,
    },
}

/// Outcome of a whole batch.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.written.len() + self.failed.len()
    }
}

/// PDF files directly inside `dir`, sorted by file name.
///
/// The extension match is case-insensitive.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DigestError::NotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// `<output_dir>/<stem><suffix>` for an input PDF.
pub fn output_path_for(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    output_dir.join(format!("{}{}", stem, suffix))
}

/// Run `pipeline` over every PDF in `dir`, writing one report per file.
pub async fn run_batch<F>(
    pipeline: &Pipeline,
    dir: &Path,
    output_dir: &Path,
    suffix: &str,
    mut on_event: F,
) -> Result<BatchSummary>
where
    F: FnMut(BatchEvent<'_>),
{
    let files = discover_pdfs(dir)?;
    info!("Found {} PDF files in {}", files.len(), dir.display());

    std::fs::create_dir_all(output_dir)?;

    let total = files.len();
    let mut summary = BatchSummary::default();

    for (index, file) in files.into_iter().enumerate() {
        on_event(BatchEvent::Started {
            file: &file,
            index,
            total,
        });

        let output = output_path_for(&file, output_dir, suffix);
        let mut sink = FileSink::new(&output);
        let source = DocumentSource::Path(file.clone());

        match pipeline.process(std::slice::from_ref(&source), &mut sink).await {
            Ok(report) => {
                info!("Saved {} answers to {}", report.len(), output.display());
                on_event(BatchEvent::Saved {
                    file: &file,
                    output: &output,
                });
                summary.written.push(output);
            }
            Err(e) => {
                error!("Failed to process {}: {}", file.display(), e);
                on_event(BatchEvent::Failed {
                    file: &file,
                    error: &e,
                });
                summary.failed.push((file, e.to_string()));
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_inputs, EchoChatModel, FakePdfLoader, HashEmbedder};
    use std::sync::Arc;

    fn fake_pipeline(dir: &Path) -> Pipeline {
        let questions = "What is the goal?\nWho leads it?\n";
        let settings = write_inputs(dir, "Context:\n{context}", questions);
        let (prompt, questions) = Pipeline::load_inputs(&settings).unwrap();
        Pipeline::with_components(
            settings,
            prompt,
            questions,
            Arc::new(FakePdfLoader),
            Arc::new(HashEmbedder::new()),
            Arc::new(EchoChatModel::new()),
        )
    }

    #[test]
    fn test_discover_pdfs_sorted_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "A.PDF", "notes.txt", "c.Pdf"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let names: Vec<String> = discover_pdfs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["A.PDF", "b.pdf", "c.Pdf"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_pdfs(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, DigestError::NotFound(_)));
    }

    #[test]
    fn test_output_path_for() {
        let path = output_path_for(
            Path::new("/plans/Austin TX.pdf"),
            Path::new("CAPS_Summaries"),
            "_Summary.md",
        );
        assert_eq!(path, PathBuf::from("CAPS_Summaries/Austin TX_Summary.md"));
    }

    #[tokio::test]
    async fn test_batch_continues_past_failures() {
        let work = tempfile::tempdir().unwrap();
        let input = work.path().join("pdfs");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("alpha.pdf"), b"Alpha plan text.").unwrap();
        std::fs::write(input.join("broken.pdf"), b"CORRUPT").unwrap();
        std::fs::write(input.join("gamma.pdf"), b"Gamma plan text.").unwrap();

        let pipeline = fake_pipeline(work.path());
        let output_dir = work.path().join("out");

        let mut events = Vec::new();
        let summary = run_batch(&pipeline, &input, &output_dir, "_Summary.md", |event| {
            events.push(format!("{:?}", std::mem::discriminant(&event)));
        })
        .await
        .unwrap();

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.written.len(), 2);
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].0.ends_with("broken.pdf"));
        assert_eq!(events.len(), 6);

        assert!(output_dir.join("alpha_Summary.md").exists());
        assert!(!output_dir.join("broken_Summary.md").exists());
        let gamma = std::fs::read_to_string(output_dir.join("gamma_Summary.md")).unwrap();
        assert_eq!(gamma.matches("### Question:").count(), 2);
        assert!(gamma.starts_with("### Question: What is the goal?\n**Answer:**\n"));
    }
}
