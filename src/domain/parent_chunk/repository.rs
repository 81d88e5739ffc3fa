//! Parent chunk repository trait

use async_trait::async_trait;

use super::entity::{ParentChunk, ParentChunkId, ParentChunkUpdate};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Storage for parent chunks, unique by content hash
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ParentChunkRepository: Send + Sync {
    /// Insert a new chunk.
    ///
    /// Fails with `DuplicateContentHash` when a chunk with the same content hash exists.
    async fn create(&self, chunk: ParentChunk) -> Result<ParentChunk, DomainError>;

    /// Get a chunk by ID
    async fn get(&self, id: &ParentChunkId) -> Result<Option<ParentChunk>, DomainError>;

    /// Get the chunk with the given content hash
    async fn get_by_content_hash(&self, content_hash: &str)
    -> Result<Option<ParentChunk>, DomainError>;

    /// Get every chunk whose ID is in `ids`. Missing IDs are skipped.
    async fn get_by_ids(&self, ids: &[ParentChunkId]) -> Result<Vec<ParentChunk>, DomainError>;

    /// Page through chunks, ordered by `chunk_index` when `order_by_index` is set
    async fn get_all(
        &self,
        skip: usize,
        limit: usize,
        order_by_index: bool,
    ) -> Result<Vec<ParentChunk>, DomainError>;

    /// Apply a partial update; `None` when the chunk does not exist
    async fn update(
        &self,
        id: &ParentChunkId,
        update: ParentChunkUpdate,
    ) -> Result<Option<ParentChunk>, DomainError>;

    /// Delete a chunk; `false` when it did not exist
    async fn delete(&self, id: &ParentChunkId) -> Result<bool, DomainError>;

    /// Count stored chunks
    async fn count(&self) -> Result<usize, DomainError>;

    /// Check whether a chunk with this content hash exists
    async fn exists_by_hash(&self, content_hash: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_content_hash(content_hash).await?.is_some())
    }
}
