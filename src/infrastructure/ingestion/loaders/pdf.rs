//! PDF document loader

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use lopdf::Document;
use tracing::{debug, warn};

use crate::domain::ingestion::{
    DocumentLoader, DocumentSegment, DocumentType, META_PAGE, META_TOTAL_PAGES,
};
use crate::domain::DomainError;

/// Loader for PDF files; each page becomes one segment.
///
/// Segments carry a zero-based `page` and the document's `total_pages`.
/// Pages whose text cannot be extracted (scanned images, unusual fonts)
/// yield empty segments rather than failing the document.
#[derive(Debug, Clone, Default)]
pub struct PdfLoader;

impl PdfLoader {
    /// Create a new PDF loader
    pub fn new() -> Self {
        Self
    }

    fn extract_pages(path: &Path, data: &[u8]) -> Result<Vec<DocumentSegment>, DomainError> {
        let doc = Document::load_mem(data).map_err(|e| {
            DomainError::document_load(format!("Failed to parse PDF '{}': {}", path.display(), e))
        })?;

        if doc.is_encrypted() {
            return Err(DomainError::document_load(format!(
                "PDF '{}' is encrypted",
                path.display()
            )));
        }

        let pages = doc.get_pages();
        let total_pages = pages.len();

        let segments = pages
            .keys()
            .enumerate()
            .map(|(index, page_number)| {
                let text = doc.extract_text(&[*page_number]).unwrap_or_else(|e| {
                    warn!(
                        path = %path.display(),
                        page = index,
                        error = %e,
                        "Could not extract text from PDF page"
                    );
                    String::new()
                });

                DocumentSegment::new(text)
                    .with_source(path, DocumentType::Pdf)
                    .with_metadata(META_PAGE, index.into())
                    .with_metadata(META_TOTAL_PAGES, total_pages.into())
            })
            .collect();

        Ok(segments)
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    fn document_type(&self) -> DocumentType {
        DocumentType::Pdf
    }

    async fn load(&self, path: &Path) -> Result<Vec<DocumentSegment>, DomainError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            DomainError::document_load(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        let owned: PathBuf = path.to_path_buf();

        // lopdf parsing is CPU-bound
        let segments = tokio::task::spawn_blocking(move || Self::extract_pages(&owned, &data))
            .await
            .map_err(|e| DomainError::internal(format!("PDF extraction task failed: {}", e)))??;

        debug!(path = %path.display(), pages = segments.len(), "Loaded PDF");

        Ok(segments)
    }
}
