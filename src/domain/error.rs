use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline stage an ingestion failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionStage {
    Detect,
    Load,
    ParentSplit,
    ChildSplit,
    Persist,
}

impl IngestionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detect => "detect",
            Self::Load => "load",
            Self::ParentSplit => "parent_split",
            Self::ChildSplit => "child_split",
            Self::Persist => "persist",
        }
    }
}

impl fmt::Display for IngestionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Unsupported document type: {message}")]
    UnsupportedDocumentType { message: String },

    #[error("Document load failed: {message}")]
    DocumentLoad { message: String },

    #[error("Invalid splitter configuration: {message}")]
    InvalidSplitterConfiguration { message: String },

    #[error("Parent chunk with content hash '{content_hash}' already exists")]
    DuplicateContentHash { content_hash: String },

    #[error("Ingestion of '{path}' failed during {stage}: {source}")]
    Ingestion {
        path: String,
        stage: IngestionStage,
        #[source]
        source: Box<DomainError>,
    },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn unsupported_document_type(message: impl Into<String>) -> Self {
        Self::UnsupportedDocumentType {
            message: message.into(),
        }
    }

    pub fn document_load(message: impl Into<String>) -> Self {
        Self::DocumentLoad {
            message: message.into(),
        }
    }

    pub fn invalid_splitter_configuration(message: impl Into<String>) -> Self {
        Self::InvalidSplitterConfiguration {
            message: message.into(),
        }
    }

    pub fn duplicate_content_hash(content_hash: impl Into<String>) -> Self {
        Self::DuplicateContentHash {
            content_hash: content_hash.into(),
        }
    }

    /// Wrap an error with the file and stage it occurred in
    pub fn ingestion(path: impl Into<String>, stage: IngestionStage, source: DomainError) -> Self {
        Self::Ingestion {
            path: path.into(),
            stage,
            source: Box::new(source),
        }
    }

    /// Stage of a wrapped ingestion failure, if any
    pub fn stage(&self) -> Option<IngestionStage> {
        match self {
            Self::Ingestion { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The innermost error, unwrapping ingestion context
    pub fn root_cause(&self) -> &DomainError {
        match self {
            Self::Ingestion { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn is_duplicate_content_hash(&self) -> bool {
        matches!(self, Self::DuplicateContentHash { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Parent chunk 'abc' not found");
        assert_eq!(error.to_string(), "Not found: Parent chunk 'abc' not found");
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Invalid input");
        assert_eq!(error.to_string(), "Validation error: Invalid input");
    }

    #[test]
    fn test_duplicate_content_hash_error() {
        let error = DomainError::duplicate_content_hash("ab".repeat(32));
        assert!(error.is_duplicate_content_hash());
        assert!(error.to_string().contains("already exists"));
    }

    #[test]
    fn test_ingestion_error_wraps_stage_and_cause() {
        let error = DomainError::ingestion(
            "/tmp/report.pdf",
            IngestionStage::Load,
            DomainError::document_load("corrupt xref table"),
        );

        assert_eq!(error.stage(), Some(IngestionStage::Load));
        assert!(matches!(
            error.root_cause(),
            DomainError::DocumentLoad { .. }
        ));
        assert_eq!(
            error.to_string(),
            "Ingestion of '/tmp/report.pdf' failed during load: Document load failed: corrupt xref table"
        );
    }

    #[test]
    fn test_stage_is_none_for_plain_errors() {
        assert!(DomainError::storage("down").stage().is_none());
    }
}
