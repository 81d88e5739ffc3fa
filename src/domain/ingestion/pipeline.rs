//! Ingestion pipeline types and configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

use super::document_type::DocumentType;
use super::splitter::{LengthFunction, SplitterConfig, SplitterType};
use crate::domain::parent_chunk::{char_count, ParentChunk, ParentChunkId};
use crate::domain::{DomainError, IngestionStage};

/// Metadata key stamped on every child chunk with its parent's identifier
pub const META_PARENT_ID: &str = "parent_id";

/// Splitter selection plus its sizing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitterSettings {
    /// Splitting algorithm
    pub splitter: SplitterType,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Preferred split boundary, tried before the splitter's defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_separator: Option<bool>,
    #[serde(default)]
    pub length_function: LengthFunction,
}

impl SplitterSettings {
    pub fn new(splitter: SplitterType, chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            splitter,
            chunk_size,
            chunk_overlap,
            separator: None,
            keep_separator: None,
            length_function: LengthFunction::default(),
        }
    }

    /// Broad-context parent chunks: recursive, 2000 with 200 overlap
    pub fn parent_default() -> Self {
        Self::new(SplitterType::RecursiveCharacter, 2000, 200)
    }

    /// Embedding-sized child chunks: recursive, 500 with 50 overlap
    pub fn child_default() -> Self {
        Self::new(SplitterType::RecursiveCharacter, 500, 50)
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn with_length_function(mut self, length_function: LengthFunction) -> Self {
        self.length_function = length_function;
        self
    }

    /// Splitter configuration built from these settings
    pub fn splitter_config(&self) -> SplitterConfig {
        SplitterConfig {
            chunk_size: Some(self.chunk_size),
            chunk_overlap: Some(self.chunk_overlap),
            separator: self.separator.clone(),
            keep_separator: self.keep_separator,
            length_function: self.length_function.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.splitter_config().validate()
    }
}

/// Configuration for the two-tier ingestion pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionSettings {
    /// Splitter producing parent chunks from loaded segments
    #[serde(default = "SplitterSettings::parent_default")]
    pub parent: SplitterSettings,
    /// Splitter producing child chunks from each parent
    #[serde(default = "SplitterSettings::child_default")]
    pub child: SplitterSettings,
    /// Documents ingested at once by batch ingestion
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    4
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            parent: SplitterSettings::parent_default(),
            child: SplitterSettings::child_default(),
            concurrency: default_concurrency(),
        }
    }
}

impl IngestionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(mut self, parent: SplitterSettings) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_child(mut self, child: SplitterSettings) -> Self {
        self.child = child;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.parent.validate()?;
        self.child.validate()?;

        if self.concurrency == 0 {
            return Err(DomainError::configuration(
                "ingestion concurrency must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Embedding-sized sub-segment of exactly one parent chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildChunk {
    pub id: Uuid,
    /// Owning parent; never outlives it
    pub parent_id: ParentChunkId,
    pub content: String,
    /// Zero-based position within the parent
    pub chunk_index: usize,
    pub char_count: usize,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ChildChunk {
    pub fn new(
        parent_id: ParentChunkId,
        content: impl Into<String>,
        chunk_index: usize,
        mut metadata: HashMap<String, serde_json::Value>,
    ) -> Self {
        let content = content.into();
        metadata.insert(
            META_PARENT_ID.to_string(),
            serde_json::Value::String(parent_id.to_string()),
        );

        Self {
            id: Uuid::new_v4(),
            parent_id,
            char_count: char_count(&content),
            content,
            chunk_index,
            metadata,
        }
    }
}

/// Result of ingesting a single document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionResult {
    pub path: PathBuf,
    pub document_type: DocumentType,
    /// One parent record per position in the document, newly created or reused.
    ///
    /// A position whose content repeats an earlier one (in this document or
    /// in storage) holds the stored record, so its `chunk_index` is the first
    /// occurrence's and indices may repeat, e.g. `[0, 1, 0]`.
    pub parent_chunks: Vec<ParentChunk>,
    /// Children of the parents created by this ingestion
    pub child_chunks: Vec<ChildChunk>,
    /// Parents inserted by this ingestion
    pub created: usize,
    /// Parents that already existed and were reused
    pub reused: usize,
}

impl IngestionResult {
    pub fn parent_ids(&self) -> Vec<ParentChunkId> {
        self.parent_chunks.iter().map(|p| *p.id()).collect()
    }

    /// Children belonging to `parent_id`, in order
    pub fn children_of(&self, parent_id: &ParentChunkId) -> Vec<&ChildChunk> {
        self.child_chunks
            .iter()
            .filter(|c| &c.parent_id == parent_id)
            .collect()
    }
}

/// A document that failed to ingest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionFailure {
    pub path: PathBuf,
    /// Stage that failed; absent for persistence errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<IngestionStage>,
    pub message: String,
}

impl IngestionFailure {
    pub fn from_error(path: impl Into<PathBuf>, error: &DomainError) -> Self {
        Self {
            path: path.into(),
            stage: error.stage(),
            message: error.to_string(),
        }
    }
}

/// Result of batch ingestion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchIngestionResult {
    pub results: Vec<IngestionResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<IngestionFailure>,
}

impl BatchIngestionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: PathBuf, result: Result<IngestionResult, DomainError>) {
        match result {
            Ok(result) => self.results.push(result),
            Err(e) => self.failures.push(IngestionFailure::from_error(path, &e)),
        }
    }

    pub fn total_documents(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Parents inserted across all documents
    pub fn total_created(&self) -> usize {
        self.results.iter().map(|r| r.created).sum()
    }

    /// Parents reused across all documents
    pub fn total_reused(&self) -> usize {
        self.results.iter().map(|r| r.reused).sum()
    }
}
