//! DOCX document loader

use async_trait::async_trait;
use std::path::Path;

use docx_rs::{DocumentChild, ParagraphChild, RunChild};

use crate::domain::ingestion::{DocumentLoader, DocumentSegment, DocumentType};
use crate::domain::DomainError;

/// Loader for Office Open XML documents; paragraph text becomes one segment
#[derive(Debug, Clone, Default)]
pub struct DocxLoader;

impl DocxLoader {
    /// Create a new DOCX loader
    pub fn new() -> Self {
        Self
    }

    /// Extract paragraph text, one paragraph per line
    pub fn extract_text(data: &[u8]) -> Result<String, DomainError> {
        let docx = docx_rs::read_docx(data)
            .map_err(|e| DomainError::document_load(format!("Failed to parse DOCX: {}", e)))?;

        let mut paragraphs = Vec::new();

        for child in docx.document.children {
            if let DocumentChild::Paragraph(paragraph) = child {
                let mut line = String::new();

                for child in paragraph.children {
                    if let ParagraphChild::Run(run) = child {
                        for child in run.children {
                            match child {
                                RunChild::Text(t) => line.push_str(&t.text),
                                RunChild::Tab(_) => line.push('\t'),
                                RunChild::Break(_) => line.push('\n'),
                                _ => {}
                            }
                        }
                    }
                }

                paragraphs.push(line);
            }
        }

        Ok(paragraphs.join("\n"))
    }
}

#[async_trait]
impl DocumentLoader for DocxLoader {
    fn document_type(&self) -> DocumentType {
        DocumentType::Docx
    }

    async fn load(&self, path: &Path) -> Result<Vec<DocumentSegment>, DomainError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            DomainError::document_load(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        let content = tokio::task::spawn_blocking(move || Self::extract_text(&data))
            .await
            .map_err(|e| DomainError::internal(format!("DOCX extraction task failed: {}", e)))??;

        Ok(vec![
            DocumentSegment::new(content).with_source(path, DocumentType::Docx),
        ])
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use docx_rs::{Docx, Paragraph, Run};
    use std::path::Path;

    /// Write a DOCX file with one paragraph per entry
    pub fn write_docx(path: &Path, paragraphs: &[&str]) {
        let mut docx = Docx::new();

        for text in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
        }

        let file = std::fs::File::create(path).unwrap();
        docx.build().pack(file).unwrap();
    }
}
