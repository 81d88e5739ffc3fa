//! notebook-ingest
//!
//! Document ingestion for retrieval-augmented generation:
//! - Magic-byte document type detection (PDF, DOC, DOCX, TXT)
//! - Per-type loaders and six configurable text splitters
//! - Two-tier chunking into parent chunks and embedding-sized child chunks
//! - Content-hash deduplication of parent chunks backed by a unique index

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::DomainError;
pub use infrastructure::ingestion::IngestionPipeline;
