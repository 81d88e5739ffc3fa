//! Parent chunk domain
//!
//! Parent chunks are the persisted, content-addressed retrieval units produced
//! by ingestion. This module holds the entity, its hashing rules and the
//! repository trait.

mod entity;
mod hashing;
mod repository;

pub use entity::{ParentChunk, ParentChunkId, ParentChunkUpdate};
pub use hashing::{char_count, content_hash, is_valid_content_hash, CONTENT_HASH_LEN};
pub use repository::ParentChunkRepository;

#[cfg(test)]
pub use repository::MockParentChunkRepository;
