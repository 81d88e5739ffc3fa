//! Document ingestion domain types and traits
//!
//! This module provides:
//! - Document type detection from leading bytes
//! - `DocumentLoader` trait turning files into text segments
//! - `TextSplitter` trait and splitter configuration
//! - Configuration and result types for the two-tier pipeline

pub mod document_type;
pub mod loader;
pub mod pipeline;
pub mod splitter;
pub mod validation;

// Re-export main types
pub use document_type::{detect_document_type, DocumentType, TEXT_PROBE_LEN};
pub use loader::{
    DocumentLoader, DocumentSegment, META_DOCUMENT_TYPE, META_PAGE, META_SOURCE, META_TOTAL_PAGES,
};
pub use pipeline::{
    BatchIngestionResult, ChildChunk, IngestionFailure, IngestionResult, IngestionSettings,
    SplitterSettings, META_PARENT_ID,
};
pub use splitter::{
    count_tokens, tokenize, LengthFunction, SplitterConfig, SplitterType, TextSplitter,
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
};
pub use validation::{validate_chunk_params, validate_page, validate_upload_size};

// Re-export mocks for testing
#[cfg(test)]
pub use loader::mock::MockDocumentLoader;
#[cfg(test)]
pub use splitter::mock::MockTextSplitter;
