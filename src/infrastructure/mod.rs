//! Infrastructure layer - Loaders, splitters, pipeline, repositories and storage

pub mod ingestion;
pub mod logging;
pub mod parent_chunk;
pub mod storage;
