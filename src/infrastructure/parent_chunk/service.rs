//! Parent chunk service for browsing and editing stored chunks

use std::sync::Arc;

use crate::domain::ingestion::validate_page;
use crate::domain::parent_chunk::{
    is_valid_content_hash, ParentChunk, ParentChunkId, ParentChunkRepository, ParentChunkUpdate,
};
use crate::domain::DomainError;

/// Page size used when the caller does not pick one
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Parent chunk service
pub struct ParentChunkService<R: ParentChunkRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: ParentChunkRepository + ?Sized> ParentChunkService<R> {
    /// Create a new parent chunk service
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Get a chunk by ID
    pub async fn get(&self, id: &str) -> Result<ParentChunk, DomainError> {
        let chunk_id: ParentChunkId = id.parse()?;

        self.repository
            .get(&chunk_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Parent chunk '{}' not found", id)))
    }

    /// Get the chunk holding the given content hash
    pub async fn get_by_content_hash(
        &self,
        content_hash: &str,
    ) -> Result<Option<ParentChunk>, DomainError> {
        if !is_valid_content_hash(content_hash) {
            return Err(DomainError::validation(format!(
                "Invalid content hash '{}'",
                content_hash
            )));
        }

        self.repository.get_by_content_hash(content_hash).await
    }

    /// Get several chunks by ID, skipping unknown ones
    pub async fn get_many(&self, ids: &[String]) -> Result<Vec<ParentChunk>, DomainError> {
        let ids = ids
            .iter()
            .map(|id| id.parse())
            .collect::<Result<Vec<ParentChunkId>, _>>()?;

        self.repository.get_by_ids(&ids).await
    }

    /// List a page of chunks
    pub async fn list(
        &self,
        skip: usize,
        limit: usize,
        order_by_index: bool,
    ) -> Result<Vec<ParentChunk>, DomainError> {
        validate_page(limit)?;
        self.repository.get_all(skip, limit, order_by_index).await
    }

    /// Count stored chunks
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    /// Check whether a chunk with this content hash exists
    pub async fn exists_by_hash(&self, content_hash: &str) -> Result<bool, DomainError> {
        self.repository.exists_by_hash(content_hash).await
    }

    /// Apply a partial update
    pub async fn update(
        &self,
        id: &str,
        update: ParentChunkUpdate,
    ) -> Result<ParentChunk, DomainError> {
        if update.is_empty() {
            return Err(DomainError::validation("Update contains no fields"));
        }

        let chunk_id: ParentChunkId = id.parse()?;

        self.repository
            .update(&chunk_id, update)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Parent chunk '{}' not found", id)))
    }

    /// Delete a chunk
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let chunk_id: ParentChunkId = id.parse()?;

        if !self.repository.delete(&chunk_id).await? {
            return Err(DomainError::not_found(format!(
                "Parent chunk '{}' not found",
                id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parent_chunk::{content_hash, MockParentChunkRepository};
    use crate::infrastructure::parent_chunk::InMemoryParentChunkRepository;
    use std::collections::HashMap;

    async fn seeded() -> (ParentChunkService<InMemoryParentChunkRepository>, ParentChunk) {
        let repository = Arc::new(InMemoryParentChunkRepository::new());
        let chunk = repository
            .create(ParentChunk::new("stored chunk", 0, HashMap::new()))
            .await
            .unwrap();

        (ParentChunkService::new(repository), chunk)
    }

    #[tokio::test]
    async fn test_get() {
        let (service, chunk) = seeded().await;

        let found = service.get(&chunk.id().to_string()).await.unwrap();
        assert_eq!(found.content(), "stored chunk");

        let missing = service.get(&ParentChunkId::new().to_string()).await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));

        let invalid = service.get("not-a-uuid").await;
        assert!(matches!(invalid, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_get_by_content_hash_validates_format() {
        let (service, chunk) = seeded().await;

        assert!(service
            .get_by_content_hash(&content_hash("stored chunk"))
            .await
            .unwrap()
            .is_some());
        assert!(service.exists_by_hash(chunk.content_hash()).await.unwrap());

        let result = service.get_by_content_hash("ABC").await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_get_many() {
        let (service, chunk) = seeded().await;

        let found = service
            .get_many(&[chunk.id().to_string(), ParentChunkId::new().to_string()])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_list_validates_limit() {
        let (service, _) = seeded().await;

        assert_eq!(service.list(0, DEFAULT_PAGE_LIMIT, true).await.unwrap().len(), 1);
        assert!(service.list(0, 0, true).await.is_err());
        assert!(service.list(0, 5000, true).await.is_err());
    }

    #[tokio::test]
    async fn test_update() {
        let (service, chunk) = seeded().await;
        let id = chunk.id().to_string();

        let updated = service
            .update(&id, ParentChunkUpdate::new().with_content("edited chunk"))
            .await
            .unwrap();
        assert_eq!(updated.content_hash(), content_hash("edited chunk"));

        let empty = service.update(&id, ParentChunkUpdate::new()).await;
        assert!(matches!(empty, Err(DomainError::Validation { .. })));

        let missing = service
            .update(
                &ParentChunkId::new().to_string(),
                ParentChunkUpdate::new().with_chunk_index(2),
            )
            .await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete() {
        let (service, chunk) = seeded().await;
        let id = chunk.id().to_string();

        service.delete(&id).await.unwrap();
        assert_eq!(service.count().await.unwrap(), 0);

        let again = service.delete(&id).await;
        assert!(matches!(again, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_repository_errors_propagate() {
        let mut repository = MockParentChunkRepository::new();
        repository
            .expect_count()
            .returning(|| Err(DomainError::storage("database unavailable")));

        let service = ParentChunkService::new(Arc::new(repository));

        assert!(matches!(
            service.count().await,
            Err(DomainError::Storage { .. })
        ));
    }
}
