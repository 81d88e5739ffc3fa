//! Content-hash deduplication of parent chunks

use std::sync::Arc;

use tracing::debug;

use crate::domain::parent_chunk::{content_hash, ParentChunk, ParentChunkRepository};
use crate::domain::DomainError;

/// Outcome of persisting a parent chunk through the deduplicator
#[derive(Debug, Clone, PartialEq)]
pub enum DedupOutcome {
    /// The chunk was inserted
    Created(ParentChunk),
    /// A chunk with the same content hash was already stored
    Existing(ParentChunk),
}

impl DedupOutcome {
    pub fn chunk(&self) -> &ParentChunk {
        match self {
            Self::Created(chunk) | Self::Existing(chunk) => chunk,
        }
    }

    pub fn into_chunk(self) -> ParentChunk {
        match self {
            Self::Created(chunk) | Self::Existing(chunk) => chunk,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Deduplicates parent chunks against the repository.
///
/// Lookups by hash are only a fast path. The repository's uniqueness
/// constraint decides; a `DuplicateContentHash` from `create` resolves
/// to the stored record.
pub struct ChunkDeduplicator<R: ParentChunkRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: ParentChunkRepository + ?Sized> Clone for ChunkDeduplicator<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<R: ParentChunkRepository + ?Sized> ChunkDeduplicator<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Dedup key for `content`
    pub fn hash(content: &str) -> String {
        content_hash(content)
    }

    pub async fn is_duplicate(&self, hash: &str) -> Result<bool, DomainError> {
        self.repository.exists_by_hash(hash).await
    }

    pub async fn find_existing(&self, hash: &str) -> Result<Option<ParentChunk>, DomainError> {
        self.repository.get_by_content_hash(hash).await
    }

    /// Insert `chunk`, or return the record that already holds its content hash
    pub async fn insert_or_existing(&self, chunk: ParentChunk) -> Result<DedupOutcome, DomainError> {
        let hash = chunk.content_hash().to_string();

        match self.repository.create(chunk).await {
            Ok(created) => Ok(DedupOutcome::Created(created)),
            Err(e) if e.is_duplicate_content_hash() => {
                debug!(content_hash = %hash, "Lost insert race, using stored parent chunk");

                self.find_existing(&hash)
                    .await?
                    .map(DedupOutcome::Existing)
                    .ok_or_else(|| {
                        DomainError::storage(format!(
                            "Parent chunk with content hash '{}' reported as duplicate but not found",
                            hash
                        ))
                    })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parent_chunk::MockParentChunkRepository;
    use crate::infrastructure::parent_chunk::InMemoryParentChunkRepository;
    use std::collections::HashMap;

    fn chunk(content: &str) -> ParentChunk {
        ParentChunk::new(content, 0, HashMap::new())
    }

    #[test]
    fn test_hash_is_byte_exact() {
        assert_eq!(ChunkDeduplicator::<InMemoryParentChunkRepository>::hash("abc").len(), 64);
        assert_ne!(
            ChunkDeduplicator::<InMemoryParentChunkRepository>::hash("abc"),
            ChunkDeduplicator::<InMemoryParentChunkRepository>::hash("abc ")
        );
    }

    #[tokio::test]
    async fn test_insert_then_existing() {
        let dedup = ChunkDeduplicator::new(Arc::new(InMemoryParentChunkRepository::new()));

        let first = dedup.insert_or_existing(chunk("shared text")).await.unwrap();
        assert!(first.is_created());
        assert!(dedup.is_duplicate(first.chunk().content_hash()).await.unwrap());

        let second = dedup.insert_or_existing(chunk("shared text")).await.unwrap();
        assert!(!second.is_created());
        assert_eq!(second.chunk().id(), first.chunk().id());
        assert_eq!(dedup.repository().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_resolves_to_stored_record() {
        let stored = chunk("contended");
        let stored_clone = stored.clone();

        let mut repo = MockParentChunkRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|c| Err(DomainError::duplicate_content_hash(c.content_hash())));
        repo.expect_get_by_content_hash()
            .times(1)
            .returning(move |_| Ok(Some(stored_clone.clone())));

        let dedup = ChunkDeduplicator::new(Arc::new(repo));
        let outcome = dedup.insert_or_existing(chunk("contended")).await.unwrap();

        assert_eq!(outcome, DedupOutcome::Existing(stored));
    }

    #[tokio::test]
    async fn test_other_create_errors_propagate() {
        let mut repo = MockParentChunkRepository::new();
        repo.expect_create()
            .returning(|_| Err(DomainError::storage("connection reset")));

        let dedup = ChunkDeduplicator::new(Arc::new(repo));
        let result = dedup.insert_or_existing(chunk("text")).await;

        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }
}
