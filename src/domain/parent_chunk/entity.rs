//! Parent chunk entity and related types

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::hashing::{char_count, content_hash, is_valid_content_hash};
use crate::domain::DomainError;

/// Parent chunk identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParentChunkId(Uuid);

impl ParentChunkId {
    /// Generate a new random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ParentChunkId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ParentChunkId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::validation(format!("Invalid parent chunk ID '{}': {}", s, e)))
    }
}

impl fmt::Display for ParentChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted, deduplicated unit of retrieval context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParentChunkRecord")]
pub struct ParentChunk {
    id: ParentChunkId,
    content: String,
    /// SHA-256 of `content`; unique across all parent chunks
    content_hash: String,
    /// Zero-based position in the source document's chunk sequence
    chunk_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_count: Option<usize>,
    char_count: usize,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Serialized shape of a parent chunk; converted through `ParentChunk::from_parts`
#[derive(Deserialize)]
struct ParentChunkRecord {
    id: ParentChunkId,
    content: String,
    content_hash: String,
    chunk_index: usize,
    #[serde(default)]
    token_count: Option<usize>,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ParentChunkRecord> for ParentChunk {
    type Error = DomainError;

    fn try_from(record: ParentChunkRecord) -> Result<Self, Self::Error> {
        Self::from_parts(
            record.id,
            record.content,
            record.content_hash,
            record.chunk_index,
            record.token_count,
            record.metadata,
            record.created_at,
            record.updated_at,
        )
    }
}

impl ParentChunk {
    /// Create a chunk with a fresh identifier, deriving hash and character count
    pub fn new(
        content: impl Into<String>,
        chunk_index: usize,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Self {
        let content = content.into();
        let now = Utc::now();

        Self {
            id: ParentChunkId::new(),
            content_hash: content_hash(&content),
            char_count: char_count(&content),
            content,
            chunk_index,
            token_count: None,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a chunk from stored fields, checking the hash invariant
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: ParentChunkId,
        content: String,
        stored_hash: String,
        chunk_index: usize,
        token_count: Option<usize>,
        metadata: HashMap<String, serde_json::Value>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let expected = content_hash(&content);

        if stored_hash != expected {
            return Err(DomainError::internal(format!(
                "Parent chunk '{}' has content hash '{}' but its content hashes to '{}'",
                id, stored_hash, expected
            )));
        }

        Ok(Self {
            id,
            char_count: char_count(&content),
            content,
            content_hash: stored_hash,
            chunk_index,
            token_count,
            metadata,
            created_at,
            updated_at,
        })
    }

    pub fn with_id(mut self, id: ParentChunkId) -> Self {
        self.id = id;
        self
    }

    pub fn with_token_count(mut self, token_count: usize) -> Self {
        self.token_count = Some(token_count);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    // Getters

    pub fn id(&self) -> &ParentChunkId {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    pub fn token_count(&self) -> Option<usize> {
        self.token_count
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn metadata(&self) -> &HashMap<String, serde_json::Value> {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the stored hash still matches the content
    pub fn has_valid_hash(&self) -> bool {
        self.content_hash == content_hash(&self.content)
    }

    /// Apply a partial update. Hash and character count follow the content.
    pub fn apply_update(&mut self, update: ParentChunkUpdate) -> Result<(), DomainError> {
        update.validate()?;

        let ParentChunkUpdate {
            content,
            content_hash: requested_hash,
            chunk_index,
            token_count,
            metadata,
        } = update;

        let expected = content_hash(content.as_deref().unwrap_or(self.content.as_str()));

        if let Some(requested) = requested_hash {
            if requested != expected {
                return Err(DomainError::validation(format!(
                    "content_hash '{}' does not match content (expected '{}')",
                    requested, expected
                )));
            }
        }

        // Nothing is modified before this point
        if let Some(content) = content {
            self.char_count = char_count(&content);
            self.content = content;
            self.content_hash = expected;
        }

        if let Some(index) = chunk_index {
            self.chunk_index = index;
        }

        if let Some(count) = token_count {
            self.token_count = Some(count);
        }

        if let Some(metadata) = metadata {
            self.metadata = metadata;
        }

        self.updated_at = Utc::now();

        Ok(())
    }
}

/// Partial update of a parent chunk; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParentChunkUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Must match the resulting content when given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl ParentChunkUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    pub fn with_chunk_index(mut self, index: usize) -> Self {
        self.chunk_index = Some(index);
        self
    }

    pub fn with_token_count(mut self, count: usize) -> Self {
        self.token_count = Some(count);
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.content_hash.is_none()
            && self.chunk_index.is_none()
            && self.token_count.is_none()
            && self.metadata.is_none()
    }

    /// Field-level checks that do not need the current record
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(ref hash) = self.content_hash {
            if !is_valid_content_hash(hash) {
                return Err(DomainError::validation(
                    "content_hash must be 64 lowercase hex characters",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str) -> ParentChunk {
        ParentChunk::new(content, 0, HashMap::new())
    }

    #[test]
    fn test_new_derives_hash_and_char_count() {
        let chunk = chunk("Grüße");

        assert_eq!(chunk.content_hash(), content_hash("Grüße"));
        assert_eq!(chunk.char_count(), 5);
        assert!(chunk.has_valid_hash());
        assert_eq!(chunk.created_at(), chunk.updated_at());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(chunk("a").id(), chunk("a").id());
    }

    #[test]
    fn test_id_parse_and_display() {
        let id = ParentChunkId::new();
        let parsed: ParentChunkId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<ParentChunkId>().is_err());
    }

    #[test]
    fn test_from_parts_rejects_hash_mismatch() {
        let now = Utc::now();
        let result = ParentChunk::from_parts(
            ParentChunkId::new(),
            "content".to_string(),
            content_hash("other content"),
            0,
            None,
            HashMap::new(),
            now,
            now,
        );

        assert!(matches!(result, Err(DomainError::Internal { .. })));
    }

    #[test]
    fn test_apply_update_recomputes_hash() {
        let mut chunk = chunk("before");
        let created = chunk.created_at();

        chunk
            .apply_update(ParentChunkUpdate::new().with_content("after edit"))
            .unwrap();

        assert_eq!(chunk.content(), "after edit");
        assert_eq!(chunk.content_hash(), content_hash("after edit"));
        assert_eq!(chunk.char_count(), 10);
        assert_eq!(chunk.created_at(), created);
        assert!(chunk.updated_at() >= created);
    }

    #[test]
    fn test_apply_update_rejects_mismatched_hash() {
        let mut chunk = chunk("original");

        let result = chunk.apply_update(
            ParentChunkUpdate::new()
                .with_content("changed")
                .with_content_hash(content_hash("something else")),
        );

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert!(chunk.has_valid_hash());
        assert_eq!(chunk.content(), "original");
        assert_eq!(chunk.content_hash(), content_hash("original"));
        assert_eq!(chunk.char_count(), 8);
    }

    #[test]
    fn test_apply_update_accepts_matching_hash() {
        let mut chunk = chunk("original");

        chunk
            .apply_update(
                ParentChunkUpdate::new()
                    .with_content("changed")
                    .with_content_hash(content_hash("changed")),
            )
            .unwrap();

        assert_eq!(chunk.content(), "changed");
    }

    #[test]
    fn test_apply_update_metadata_only() {
        let mut chunk = chunk("same");
        let hash = chunk.content_hash().to_string();

        let mut metadata = HashMap::new();
        metadata.insert("section".to_string(), serde_json::json!("Intro"));

        chunk
            .apply_update(
                ParentChunkUpdate::new()
                    .with_metadata(metadata)
                    .with_chunk_index(4)
                    .with_token_count(12),
            )
            .unwrap();

        assert_eq!(chunk.content_hash(), hash);
        assert_eq!(chunk.chunk_index(), 4);
        assert_eq!(chunk.token_count(), Some(12));
        assert_eq!(chunk.metadata()["section"], serde_json::json!("Intro"));
    }

    #[test]
    fn test_update_validate_hash_shape() {
        let update = ParentChunkUpdate::new().with_content_hash("ABC");
        assert!(update.validate().is_err());
        assert!(ParentChunkUpdate::new().is_empty());
    }

    #[test]
    fn test_serialization_round_trip() {
        let chunk = chunk("serialized").with_token_count(1);
        let json = serde_json::to_value(&chunk).unwrap();

        assert_eq!(json["content_hash"], serde_json::json!(content_hash("serialized")));
        assert_eq!(json["char_count"], serde_json::json!(10));

        let parsed: ParentChunk = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, chunk);
    }

    #[test]
    fn test_deserialize_rejects_tampered_content() {
        let mut json = serde_json::to_value(chunk("signed off")).unwrap();
        json["content"] = serde_json::json!("quietly edited");

        let result = serde_json::from_value::<ParentChunk>(json);

        assert!(result.is_err());
    }

    #[test]
    fn test_apply_update_rejected_hash_leaves_chunk_untouched() {
        let mut chunk = chunk("original");
        let before = chunk.clone();

        let result = chunk.apply_update(
            ParentChunkUpdate::new()
                .with_content_hash(content_hash("unrelated"))
                .with_chunk_index(9),
        );

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert_eq!(chunk, before);
    }
}
