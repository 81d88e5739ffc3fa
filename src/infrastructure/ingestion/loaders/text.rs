//! Plain text document loader

use async_trait::async_trait;
use std::path::Path;

use crate::domain::ingestion::{DocumentLoader, DocumentSegment, DocumentType};
use crate::domain::DomainError;

/// Loader for UTF-8 text files; the whole file becomes one segment
#[derive(Debug, Clone, Default)]
pub struct TextLoader;

impl TextLoader {
    /// Create a new text loader
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentLoader for TextLoader {
    fn document_type(&self) -> DocumentType {
        DocumentType::Txt
    }

    async fn load(&self, path: &Path) -> Result<Vec<DocumentSegment>, DomainError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            DomainError::document_load(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        let content = String::from_utf8(bytes).map_err(|e| {
            DomainError::document_load(format!(
                "'{}' is not valid UTF-8 text: {}",
                path.display(),
                e.utf8_error()
            ))
        })?;

        Ok(vec![
            DocumentSegment::new(content).with_source(path, DocumentType::Txt),
        ])
    }
}
