//! Storage factory for runtime backend selection

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::domain::parent_chunk::ParentChunkRepository;
use crate::domain::DomainError;
use crate::infrastructure::parent_chunk::{
    InMemoryParentChunkRepository, PostgresParentChunkRepository,
};

use super::migrations::run_storage_migrations;
use super::postgres::{connect_pool, PostgresConfig};

/// Supported storage backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum StorageType {
    /// Process-local storage, lost on exit
    #[default]
    InMemory,
    Postgres,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InMemory => "memory",
            Self::Postgres => "postgres",
        }
    }
}

impl FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(DomainError::configuration(format!(
                "Unknown storage backend '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for StorageType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Postgres(PostgresConfig),
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn postgres(config: PostgresConfig) -> Self {
        Self::Postgres(config)
    }

    pub fn postgres_url(url: impl Into<String>) -> Self {
        Self::Postgres(PostgresConfig::new(url))
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// Factory for creating parent chunk repositories
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Create the repository for the configured backend.
    ///
    /// The PostgreSQL backend connects and applies pending migrations first.
    pub async fn create_parent_chunk_repository(
        config: &StorageConfig,
    ) -> Result<Arc<dyn ParentChunkRepository>, DomainError> {
        match config {
            StorageConfig::InMemory => Ok(Self::create_in_memory()),
            StorageConfig::Postgres(pg_config) => {
                Ok(Self::create_postgres(pg_config).await?)
            }
        }
    }

    pub fn create_in_memory() -> Arc<InMemoryParentChunkRepository> {
        Arc::new(InMemoryParentChunkRepository::new())
    }

    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> Result<Arc<PostgresParentChunkRepository>, DomainError> {
        config.validate()?;

        let pool = connect_pool(config).await?;
        run_storage_migrations(&pool).await?;

        Ok(Arc::new(PostgresParentChunkRepository::new(pool)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_from_str() {
        assert_eq!("memory".parse::<StorageType>().unwrap(), StorageType::InMemory);
        assert_eq!("in-memory".parse::<StorageType>().unwrap(), StorageType::InMemory);
        assert_eq!("Postgres".parse::<StorageType>().unwrap(), StorageType::Postgres);
        assert_eq!("pg".parse::<StorageType>().unwrap(), StorageType::Postgres);
        assert!(matches!(
            "sqlite".parse::<StorageType>(),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_storage_type_deserialize() {
        let parsed: StorageType = serde_json::from_str(r#""postgresql""#).unwrap();
        assert_eq!(parsed, StorageType::Postgres);
        assert!(serde_json::from_str::<StorageType>(r#""redis""#).is_err());
    }

    #[test]
    fn test_storage_config_types() {
        assert_eq!(StorageConfig::in_memory().storage_type(), StorageType::InMemory);
        assert_eq!(
            StorageConfig::postgres_url("postgres://localhost/test").storage_type(),
            StorageType::Postgres
        );
    }

    #[tokio::test]
    async fn test_create_in_memory_repository() {
        let repository = StorageFactory::create_parent_chunk_repository(&StorageConfig::in_memory())
            .await
            .unwrap();

        assert_eq!(repository.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_postgres_config_validated_before_connecting() {
        let config = StorageConfig::postgres(PostgresConfig::new("postgres://h/db").with_max_connections(0));

        let result = StorageFactory::create_parent_chunk_repository(&config).await;

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
