//! In-memory parent chunk repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::parent_chunk::{
    ParentChunk, ParentChunkId, ParentChunkRepository, ParentChunkUpdate,
};
use crate::domain::DomainError;

/// In-memory implementation of ParentChunkRepository
#[derive(Debug, Clone)]
pub struct InMemoryParentChunkRepository {
    chunks: Arc<RwLock<HashMap<ParentChunkId, ParentChunk>>>,
    /// Index for content hash -> chunk ID lookup
    hash_index: Arc<RwLock<HashMap<String, ParentChunkId>>>,
}

impl InMemoryParentChunkRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            chunks: Arc::new(RwLock::new(HashMap::new())),
            hash_index: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository with initial chunks; later duplicates of a hash are dropped
    pub fn with_chunks(chunks: Vec<ParentChunk>) -> Self {
        let mut chunk_map = HashMap::new();
        let mut hash_map = HashMap::new();

        for chunk in chunks {
            if hash_map.contains_key(chunk.content_hash()) {
                continue;
            }

            hash_map.insert(chunk.content_hash().to_string(), *chunk.id());
            chunk_map.insert(*chunk.id(), chunk);
        }

        Self {
            chunks: Arc::new(RwLock::new(chunk_map)),
            hash_index: Arc::new(RwLock::new(hash_map)),
        }
    }
}

impl Default for InMemoryParentChunkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ParentChunkRepository for InMemoryParentChunkRepository {
    async fn create(&self, chunk: ParentChunk) -> Result<ParentChunk, DomainError> {
        // Both locks are held for the check and the insert
        let mut chunks = self.chunks.write().await;
        let mut hash_index = self.hash_index.write().await;

        if hash_index.contains_key(chunk.content_hash()) {
            return Err(DomainError::duplicate_content_hash(chunk.content_hash()));
        }

        if chunks.contains_key(chunk.id()) {
            return Err(DomainError::conflict(format!(
                "Parent chunk with ID '{}' already exists",
                chunk.id()
            )));
        }

        hash_index.insert(chunk.content_hash().to_string(), *chunk.id());
        chunks.insert(*chunk.id(), chunk.clone());

        Ok(chunk)
    }

    async fn get(&self, id: &ParentChunkId) -> Result<Option<ParentChunk>, DomainError> {
        let chunks = self.chunks.read().await;
        Ok(chunks.get(id).cloned())
    }

    async fn get_by_content_hash(
        &self,
        content_hash: &str,
    ) -> Result<Option<ParentChunk>, DomainError> {
        let chunks = self.chunks.read().await;
        let hash_index = self.hash_index.read().await;

        Ok(hash_index
            .get(content_hash)
            .and_then(|id| chunks.get(id))
            .cloned())
    }

    async fn get_by_ids(&self, ids: &[ParentChunkId]) -> Result<Vec<ParentChunk>, DomainError> {
        let chunks = self.chunks.read().await;
        Ok(ids.iter().filter_map(|id| chunks.get(id).cloned()).collect())
    }

    async fn get_all(
        &self,
        skip: usize,
        limit: usize,
        order_by_index: bool,
    ) -> Result<Vec<ParentChunk>, DomainError> {
        let chunks = self.chunks.read().await;
        let mut all: Vec<&ParentChunk> = chunks.values().collect();

        if order_by_index {
            all.sort_by(|a, b| {
                a.chunk_index()
                    .cmp(&b.chunk_index())
                    .then_with(|| a.created_at().cmp(&b.created_at()))
                    .then_with(|| a.id().cmp(b.id()))
            });
        } else {
            all.sort_by(|a, b| {
                a.created_at()
                    .cmp(&b.created_at())
                    .then_with(|| a.id().cmp(b.id()))
            });
        }

        Ok(all.into_iter().skip(skip).take(limit).cloned().collect())
    }

    async fn update(
        &self,
        id: &ParentChunkId,
        update: ParentChunkUpdate,
    ) -> Result<Option<ParentChunk>, DomainError> {
        let mut chunks = self.chunks.write().await;
        let mut hash_index = self.hash_index.write().await;

        let Some(current) = chunks.get(id) else {
            return Ok(None);
        };

        let old_hash = current.content_hash().to_string();
        let mut updated = current.clone();
        updated.apply_update(update)?;

        if updated.content_hash() != old_hash {
            if hash_index.contains_key(updated.content_hash()) {
                return Err(DomainError::duplicate_content_hash(updated.content_hash()));
            }

            hash_index.remove(&old_hash);
            hash_index.insert(updated.content_hash().to_string(), *id);
        }

        chunks.insert(*id, updated.clone());

        Ok(Some(updated))
    }

    async fn delete(&self, id: &ParentChunkId) -> Result<bool, DomainError> {
        let mut chunks = self.chunks.write().await;
        let mut hash_index = self.hash_index.write().await;

        if let Some(chunk) = chunks.remove(id) {
            hash_index.remove(chunk.content_hash());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let chunks = self.chunks.read().await;
        Ok(chunks.len())
    }

    async fn exists_by_hash(&self, content_hash: &str) -> Result<bool, DomainError> {
        let hash_index = self.hash_index.read().await;
        Ok(hash_index.contains_key(content_hash))
    }
}
