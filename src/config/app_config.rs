use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::ingestion::IngestionSettings;
use crate::domain::DomainError;
use crate::infrastructure::storage::{PostgresConfig, StorageConfig, StorageType};

/// Default upload size limit: 1 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub storage: StorageSettings,
    pub uploads: UploadConfig,
    pub ingestion: IngestionSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageType,
    pub postgres: PostgresConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory accepted files are staged in
    pub dir: PathBuf,
    /// Largest accepted file, in bytes
    pub max_file_size: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./uploads"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl StorageSettings {
    pub fn storage_config(&self) -> StorageConfig {
        match self.backend {
            StorageType::InMemory => StorageConfig::in_memory(),
            StorageType::Postgres => StorageConfig::postgres(self.postgres.clone()),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Check the settings and create the upload directory.
    ///
    /// Called once from the process entry point.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.ingestion.validate()?;

        if self.storage.backend == StorageType::Postgres {
            self.storage.postgres.validate()?;
        }

        if self.uploads.max_file_size == 0 {
            return Err(DomainError::configuration(
                "uploads.max_file_size must be greater than 0",
            ));
        }

        std::fs::create_dir_all(&self.uploads.dir).map_err(|e| {
            DomainError::configuration(format!(
                "Failed to create upload directory '{}': {}",
                self.uploads.dir.display(),
                e
            ))
        })?;

        Ok(())
    }
}
