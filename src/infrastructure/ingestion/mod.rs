//! Document ingestion infrastructure
//!
//! This module provides the document loaders, text splitters, content-hash
//! deduplication and the two-tier ingestion pipeline.

pub mod dedup;
pub mod factory;
pub mod loaders;
pub mod pipeline;
pub mod splitters;

// Re-export loaders
pub use loaders::{DocLoader, DocxLoader, PdfLoader, TextLoader};

// Re-export splitters
pub use splitters::{
    CharacterSplitter, CodeSplitter, HtmlHeaderSplitter, MarkdownSplitter,
    RecursiveCharacterSplitter, TokenSplitter,
};

// Re-export registries
pub use factory::{detect_file_type, LoaderRegistry, SplitterFactory};

// Re-export pipeline
pub use dedup::{ChunkDeduplicator, DedupOutcome};
pub use pipeline::IngestionPipeline;
