//! Domain layer - Core ingestion types, traits and errors

pub mod error;
pub mod ingestion;
pub mod parent_chunk;

pub use error::{DomainError, IngestionStage};
pub use ingestion::{
    BatchIngestionResult, ChildChunk, DocumentLoader, DocumentSegment, DocumentType,
    IngestionFailure, IngestionResult, IngestionSettings, LengthFunction, SplitterConfig,
    SplitterSettings, SplitterType, TextSplitter,
};
pub use parent_chunk::{
    content_hash, ParentChunk, ParentChunkId, ParentChunkRepository, ParentChunkUpdate,
};
