//! Legacy Word (.doc) document loader

use async_trait::async_trait;
use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use super::docx::DocxLoader;
use crate::domain::ingestion::{DocumentLoader, DocumentSegment, DocumentType};
use crate::domain::DomainError;

/// Default converter executable
pub const DEFAULT_CONVERTER: &str = "libreoffice";

/// Loader for legacy binary Word documents.
///
/// The file is converted to DOCX with a headless LibreOffice in a scratch
/// directory, then read like any DOCX.
#[derive(Debug, Clone)]
pub struct DocLoader {
    converter: String,
}

impl Default for DocLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocLoader {
    /// Create a loader using the `libreoffice` executable on `PATH`
    pub fn new() -> Self {
        Self {
            converter: DEFAULT_CONVERTER.to_string(),
        }
    }

    /// Use a different converter executable (e.g. `soffice`)
    pub fn with_converter(mut self, converter: impl Into<String>) -> Self {
        self.converter = converter.into();
        self
    }

    async fn convert_to_docx(&self, path: &Path) -> Result<Vec<u8>, DomainError> {
        let scratch = tempfile::tempdir().map_err(|e| {
            DomainError::document_load(format!("Failed to create conversion directory: {}", e))
        })?;

        let input = scratch.path().join("input.doc");
        tokio::fs::copy(path, &input).await.map_err(|e| {
            DomainError::document_load(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        let output = Command::new(&self.converter)
            .arg("--headless")
            .arg("--convert-to")
            .arg("docx")
            .arg("--outdir")
            .arg(scratch.path())
            .arg(&input)
            .output()
            .await
            .map_err(|e| {
                DomainError::document_load(format!(
                    "Failed to run '{}' to convert '{}': {}",
                    self.converter,
                    path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(DomainError::document_load(format!(
                "Converting '{}' to DOCX failed: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let converted = scratch.path().join("input.docx");
        tokio::fs::read(&converted).await.map_err(|e| {
            DomainError::document_load(format!(
                "Converter produced no DOCX for '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl DocumentLoader for DocLoader {
    fn document_type(&self) -> DocumentType {
        DocumentType::Doc
    }

    async fn load(&self, path: &Path) -> Result<Vec<DocumentSegment>, DomainError> {
        let data = self.convert_to_docx(path).await?;
        debug!(path = %path.display(), bytes = data.len(), "Converted DOC to DOCX");

        let content = tokio::task::spawn_blocking(move || DocxLoader::extract_text(&data))
            .await
            .map_err(|e| DomainError::internal(format!("DOCX extraction task failed: {}", e)))??;

        Ok(vec![
            DocumentSegment::new(content).with_source(path, DocumentType::Doc),
        ])
    }
}
