//! Scoped temporary copies of input documents.

use super::DocumentSource;
use crate::error::{DigestError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// A document materialized to a temporary `.pdf` file.
///
/// The file is removed when the value is dropped.
#[derive(Debug)]
pub struct StagedDocument {
    file: NamedTempFile,
    name: String,
}

impl StagedDocument {
    /// Copy `source` into a new temporary file under `temp_dir`.
    pub fn stage(source: &DocumentSource, temp_dir: &Path) -> Result<Self> {
        let name = source.display_name();

        let bytes = match source {
            DocumentSource::Path(path) => {
                if !path.is_file() {
                    return Err(DigestError::NotFound(path.clone()));
                }
                std::fs::read(path)?
            }
            DocumentSource::Upload { bytes, .. } => bytes.clone(),
        };

        if bytes.is_empty() {
            return Err(DigestError::InvalidInput(format!("{} is empty", name)));
        }

        std::fs::create_dir_all(temp_dir)?;
        let mut file = tempfile::Builder::new()
            .prefix("plandigest-")
            .suffix(".pdf")
            .tempfile_in(temp_dir)?;
        file.write_all(&bytes)?;
        file.flush()?;

        debug!("Staged {} at {}", name, file.path().display());

        Ok(Self { file, name })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let source = DocumentSource::Upload {
            file_name: "plan.pdf".to_string(),
            bytes: b"%PDF-1.4 fake".to_vec(),
        };

        let staged = StagedDocument::stage(&source, dir.path()).unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(staged.name(), "plan.pdf");
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 fake");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = DocumentSource::Path(dir.path().join("missing.pdf"));
        let err = StagedDocument::stage(&source, dir.path()).unwrap_err();
        assert!(matches!(err, DigestError::NotFound(_)));
    }

    #[test]
    fn test_empty_upload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = DocumentSource::Upload {
            file_name: "empty.pdf".to_string(),
            bytes: Vec::new(),
        };
        assert!(StagedDocument::stage(&source, dir.path()).is_err());
    }
}
