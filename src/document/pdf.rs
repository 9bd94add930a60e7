//! PDF text extraction with lopdf.

use super::{DocumentLoader, PageText, StagedDocument};
use crate::error::{DigestError, Result};
use async_trait::async_trait;
use lopdf::Document;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Page-by-page PDF loader.
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    /// Extract the text of every page, in page order.
    fn extract_pages(path: &Path, name: &str) -> Result<Vec<PageText>> {
        let doc = Document::load(path)
            .map_err(|e| DigestError::Document(format!("Failed to load {}: {}", name, e)))?;
        if doc.is_encrypted() {
            return Err(DigestError::Document(format!("{} is encrypted", name)));
        }

        let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();
        if page_numbers.is_empty() {
            return Err(DigestError::Document(format!("{} has no pages", name)));
        }

        let mut pages = Vec::with_capacity(page_numbers.len());
        for page_number in page_numbers {
            match doc.extract_text(&[page_number]) {
                Ok(text) => pages.push(PageText::new(name, page_number, text)),
                Err(e) => {
                    warn!("Could not extract page {} of {}: {}", page_number, name, e);
                }
            }
        }

        if pages.iter().all(|p| p.text.trim().is_empty()) {
            return Err(DigestError::Document(format!(
                "{} has no extractable text (it may be scanned or encrypted)",
                name
            )));
        }

        Ok(pages)
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    #[instrument(skip(self, document), fields(document = %document.name()))]
    async fn load(&self, document: &StagedDocument) -> Result<Vec<PageText>> {
        let path = document.path().to_path_buf();
        let name = document.name().to_string();

        let pages = tokio::task::spawn_blocking(move || Self::extract_pages(&path, &name))
            .await
            .map_err(|e| DigestError::Document(format!("PDF extraction task failed: {}", e)))??;

        debug!("Extracted {} pages", pages.len());
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentSource;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build a PDF with one Helvetica text line per page.
    fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for line in lines {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => lines.len() as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_pages_are_extracted_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = DocumentSource::Upload {
            file_name: "plan.pdf".to_string(),
            bytes: pdf_with_pages(&["First page text.", "Second page text."]),
        };
        let staged = StagedDocument::stage(&source, dir.path()).unwrap();

        let pages = PdfLoader::new().load(&staged).await.unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[1].page_number, 2);
        assert!(pages[0].text.contains("First page text."));
        assert!(pages[1].text.contains("Second page text."));
        assert!(pages.iter().all(|p| p.source == "plan.pdf"));
    }

    #[tokio::test]
    async fn test_invalid_pdf_is_document_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DocumentSource::Upload {
            file_name: "broken.pdf".to_string(),
            bytes: b"this is not a pdf".to_vec(),
        };
        let staged = StagedDocument::stage(&source, dir.path()).unwrap();

        let err = PdfLoader::new().load(&staged).await.unwrap_err();
        assert!(matches!(err, DigestError::Document(_)));
        assert!(err.to_string().contains("broken.pdf"));
    }
}
