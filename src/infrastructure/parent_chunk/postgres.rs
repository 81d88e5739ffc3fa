//! PostgreSQL parent chunk repository implementation

use async_trait::async_trait;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::parent_chunk::{
    ParentChunk, ParentChunkId, ParentChunkRepository, ParentChunkUpdate,
};
use crate::domain::DomainError;

const SELECT_COLUMNS: &str = r#"
    SELECT id, content, content_hash, chunk_index, token_count, metadata,
           created_at, updated_at
    FROM parent_chunks
"#;

/// PostgreSQL implementation of ParentChunkRepository
///
/// Relies on the `UNIQUE` index on `parent_chunks.content_hash`; see the
/// storage migrations.
#[derive(Debug, Clone)]
pub struct PostgresParentChunkRepository {
    pool: PgPool,
}

impl PostgresParentChunkRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ParentChunkRepository for PostgresParentChunkRepository {
    async fn create(&self, chunk: ParentChunk) -> Result<ParentChunk, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO parent_chunks (id, content, content_hash, chunk_index, token_count,
                                       char_count, metadata, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(*chunk.id().as_uuid())
        .bind(chunk.content())
        .bind(chunk.content_hash())
        .bind(to_db_count(chunk.chunk_index()))
        .bind(chunk.token_count().map(to_db_count))
        .bind(to_db_count(chunk.char_count()))
        .bind(Json(chunk.metadata()))
        .bind(chunk.created_at())
        .bind(chunk.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &chunk, "create"))?;

        Ok(chunk)
    }

    async fn get(&self, id: &ParentChunkId) -> Result<Option<ParentChunk>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get parent chunk: {}", e)))?;

        row.as_ref().map(row_to_chunk).transpose()
    }

    async fn get_by_content_hash(
        &self,
        content_hash: &str,
    ) -> Result<Option<ParentChunk>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE content_hash = $1", SELECT_COLUMNS))
            .bind(content_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to get parent chunk by hash: {}", e))
            })?;

        row.as_ref().map(row_to_chunk).transpose()
    }

    async fn get_by_ids(&self, ids: &[ParentChunkId]) -> Result<Vec<ParentChunk>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows = sqlx::query(&format!("{} WHERE id = ANY($1)", SELECT_COLUMNS))
            .bind(&uuids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get parent chunks: {}", e)))?;

        let mut by_id = HashMap::with_capacity(rows.len());

        for row in &rows {
            let chunk = row_to_chunk(row)?;
            by_id.insert(*chunk.id(), chunk);
        }

        // Keep the caller's order
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn get_all(
        &self,
        skip: usize,
        limit: usize,
        order_by_index: bool,
    ) -> Result<Vec<ParentChunk>, DomainError> {
        let order = if order_by_index {
            "ORDER BY chunk_index, created_at, id"
        } else {
            "ORDER BY created_at, id"
        };

        let rows = sqlx::query(&format!(
            "{} {} LIMIT $1 OFFSET $2",
            SELECT_COLUMNS, order
        ))
        .bind(to_db_count(limit))
        .bind(to_db_count(skip))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list parent chunks: {}", e)))?;

        rows.iter().map(row_to_chunk).collect()
    }

    async fn update(
        &self,
        id: &ParentChunkId,
        update: ParentChunkUpdate,
    ) -> Result<Option<ParentChunk>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let row = sqlx::query(&format!("{} WHERE id = $1 FOR UPDATE", SELECT_COLUMNS))
            .bind(*id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get parent chunk: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut chunk = row_to_chunk(&row)?;
        chunk.apply_update(update)?;

        sqlx::query(
            r#"
            UPDATE parent_chunks
            SET content = $2, content_hash = $3, chunk_index = $4, token_count = $5,
                char_count = $6, metadata = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(*chunk.id().as_uuid())
        .bind(chunk.content())
        .bind(chunk.content_hash())
        .bind(to_db_count(chunk.chunk_index()))
        .bind(chunk.token_count().map(to_db_count))
        .bind(to_db_count(chunk.char_count()))
        .bind(Json(chunk.metadata()))
        .bind(chunk.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, &chunk, "update"))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit update: {}", e)))?;

        Ok(Some(chunk))
    }

    async fn delete(&self, id: &ParentChunkId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM parent_chunks WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete parent chunk: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM parent_chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count parent chunks: {}", e)))?;

        Ok(count as usize)
    }

    async fn exists_by_hash(&self, content_hash: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM parent_chunks WHERE content_hash = $1)")
            .bind(content_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check content hash: {}", e)))
    }
}

fn map_write_error(e: sqlx::Error, chunk: &ParentChunk, operation: &str) -> DomainError {
    let msg = e.to_string();

    if msg.contains("duplicate key") || msg.contains("unique constraint") {
        if msg.contains("content_hash") {
            DomainError::duplicate_content_hash(chunk.content_hash())
        } else {
            DomainError::conflict(format!(
                "Parent chunk with ID '{}' already exists",
                chunk.id()
            ))
        }
    } else {
        DomainError::storage(format!("Failed to {} parent chunk: {}", operation, e))
    }
}

fn to_db_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_db_count(value: i64, column: &str) -> Result<usize, DomainError> {
    usize::try_from(value)
        .map_err(|_| DomainError::storage(format!("Negative {} in database: {}", column, value)))
}

fn row_to_chunk(row: &PgRow) -> Result<ParentChunk, DomainError> {
    let read_error = |e: sqlx::Error| DomainError::storage(format!("Failed to read row: {}", e));

    let id: Uuid = row.try_get("id").map_err(read_error)?;
    let content: String = row.try_get("content").map_err(read_error)?;
    let content_hash: String = row.try_get("content_hash").map_err(read_error)?;
    let chunk_index: i64 = row.try_get("chunk_index").map_err(read_error)?;
    let token_count: Option<i64> = row.try_get("token_count").map_err(read_error)?;
    let metadata: Json<HashMap<String, serde_json::Value>> =
        row.try_get("metadata").map_err(read_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read_error)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(read_error)?;

    ParentChunk::from_parts(
        ParentChunkId::from_uuid(id),
        content,
        content_hash,
        from_db_count(chunk_index, "chunk_index")?,
        token_count
            .map(|count| from_db_count(count, "token_count"))
            .transpose()?,
        metadata.0,
        created_at,
        updated_at,
    )
}
