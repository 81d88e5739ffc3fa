//! Document loader trait and segment type

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::document_type::DocumentType;
use crate::domain::DomainError;

/// Metadata key holding the originating file path
pub const META_SOURCE: &str = "source";
/// Metadata key holding the zero-based page number
pub const META_PAGE: &str = "page";
/// Metadata key holding the page count of the source document
pub const META_TOTAL_PAGES: &str = "total_pages";
/// Metadata key holding the detected document type
pub const META_DOCUMENT_TYPE: &str = "document_type";

/// One unit of loaded text plus its source metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSegment {
    /// Extracted text
    pub content: String,
    /// Provenance such as source path and page number
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl DocumentSegment {
    /// Create a segment with no metadata
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Stamp the standard provenance keys for a loaded file
    pub fn with_source(self, path: &Path, document_type: DocumentType) -> Self {
        self.with_metadata(
            META_SOURCE,
            serde_json::Value::String(path.display().to_string()),
        )
        .with_metadata(
            META_DOCUMENT_TYPE,
            serde_json::Value::String(document_type.as_str().to_string()),
        )
    }

    /// Zero-based page number, when the loader knows it
    pub fn page(&self) -> Option<u64> {
        self.metadata.get(META_PAGE).and_then(|v| v.as_u64())
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Strategy that turns a file of one document type into ordered text segments
#[async_trait]
pub trait DocumentLoader: Send + Sync + Debug {
    /// Document type this loader handles
    fn document_type(&self) -> DocumentType;

    /// Load the file at `path` into segments in document order
    async fn load(&self, path: &Path) -> Result<Vec<DocumentSegment>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Mock loader returning canned segments or an error
    #[derive(Debug)]
    pub struct MockDocumentLoader {
        document_type: DocumentType,
        result: Mutex<Option<Result<Vec<DocumentSegment>, String>>>,
    }

    impl MockDocumentLoader {
        pub fn new(document_type: DocumentType) -> Self {
            Self {
                document_type,
                result: Mutex::new(None),
            }
        }

        pub fn with_segments(self, segments: Vec<DocumentSegment>) -> Self {
            *self.result.lock().unwrap() = Some(Ok(segments));
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.result.lock().unwrap() = Some(Err(error.into()));
            self
        }
    }

    #[async_trait]
    impl DocumentLoader for MockDocumentLoader {
        fn document_type(&self) -> DocumentType {
            self.document_type
        }

        async fn load(&self, path: &Path) -> Result<Vec<DocumentSegment>, DomainError> {
            if let Some(result) = self.result.lock().unwrap().take() {
                return result.map_err(DomainError::document_load);
            }

            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| DomainError::document_load(e.to_string()))?;

            Ok(vec![DocumentSegment::new(content).with_source(path, self.document_type)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_with_source() {
        let segment = DocumentSegment::new("text")
            .with_source(Path::new("/data/notes.txt"), DocumentType::Txt);

        assert_eq!(
            segment.metadata.get(META_SOURCE),
            Some(&serde_json::Value::String("/data/notes.txt".to_string()))
        );
        assert_eq!(
            segment.metadata.get(META_DOCUMENT_TYPE),
            Some(&serde_json::Value::String("txt".to_string()))
        );
    }

    #[test]
    fn test_segment_page() {
        let segment = DocumentSegment::new("page two").with_metadata(META_PAGE, 1.into());
        assert_eq!(segment.page(), Some(1));
        assert_eq!(DocumentSegment::new("no page").page(), None);
    }

    #[test]
    fn test_segment_is_blank() {
        assert!(DocumentSegment::new(" \n\t").is_blank());
        assert!(!DocumentSegment::new(" x ").is_blank());
    }

    #[tokio::test]
    async fn test_mock_loader_error() {
        let loader = mock::MockDocumentLoader::new(DocumentType::Pdf).with_error("corrupt");
        let result = loader.load(Path::new("/nowhere.pdf")).await;

        assert!(matches!(result, Err(DomainError::DocumentLoad { .. })));
    }
}
