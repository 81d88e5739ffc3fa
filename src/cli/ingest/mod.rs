//! Ingest command - runs documents through the two-tier pipeline

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;
use uuid::Uuid;

use crate::config::{AppConfig, UploadConfig};
use crate::domain::ingestion::{validate_upload_size, BatchIngestionResult, IngestionFailure};
use crate::domain::DomainError;
use crate::infrastructure::ingestion::IngestionPipeline;
use crate::infrastructure::storage::StorageFactory;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Files to ingest
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Copy each accepted file into the upload directory and ingest the copy
    #[arg(long)]
    pub stage: bool,

    /// Documents ingested at once (defaults to `ingestion.concurrency`)
    #[arg(long)]
    pub concurrency: Option<usize>,
}

pub async fn run(args: IngestArgs) -> anyhow::Result<()> {
    let config = crate::cli::bootstrap()?;
    let batch = ingest(&config, &args).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        print_summary(&batch);
    }

    if !batch.is_success() {
        anyhow::bail!(
            "{} of {} documents failed",
            batch.failures.len(),
            batch.total_documents()
        );
    }

    Ok(())
}

async fn ingest(config: &AppConfig, args: &IngestArgs) -> anyhow::Result<BatchIngestionResult> {
    let repository =
        StorageFactory::create_parent_chunk_repository(&config.storage.storage_config()).await?;
    let pipeline = IngestionPipeline::new(repository, &config.ingestion)?;

    let mut accepted = Vec::with_capacity(args.files.len());
    let mut rejected = Vec::new();

    for file in &args.files {
        match accept_upload(file, &config.uploads, args.stage).await {
            Ok(path) => accepted.push(path),
            Err(e) => rejected.push(IngestionFailure::from_error(file, &e)),
        }
    }

    let concurrency = args.concurrency.unwrap_or(config.ingestion.concurrency);
    info!(files = accepted.len(), concurrency, "Starting ingestion");

    let mut batch = pipeline.ingest_many(&accepted, concurrency).await;
    batch.failures.extend(rejected);

    Ok(batch)
}

/// Check the file against the upload limits, staging a copy when asked
async fn accept_upload(path: &Path, uploads: &UploadConfig, stage: bool) -> Result<PathBuf, DomainError> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        DomainError::validation(format!("Cannot read '{}': {}", path.display(), e))
    })?;

    if !metadata.is_file() {
        return Err(DomainError::validation(format!(
            "'{}' is not a regular file",
            path.display()
        )));
    }

    validate_upload_size(metadata.len(), uploads.max_file_size)?;

    if !stage {
        return Ok(path.to_path_buf());
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let staged = uploads.dir.join(format!("{}-{}", Uuid::new_v4(), file_name));

    tokio::fs::copy(path, &staged).await.map_err(|e| {
        DomainError::storage(format!(
            "Failed to stage '{}' into '{}': {}",
            path.display(),
            uploads.dir.display(),
            e
        ))
    })?;

    Ok(staged)
}

fn print_summary(batch: &BatchIngestionResult) {
    for result in &batch.results {
        println!(
            "{} [{}]: {} parent chunks ({} new, {} reused), {} child chunks",
            result.path.display(),
            result.document_type,
            result.parent_chunks.len(),
            result.created,
            result.reused,
            result.child_chunks.len()
        );
    }

    for failure in &batch.failures {
        match failure.stage {
            Some(stage) => println!(
                "{}: failed during {}: {}",
                failure.path.display(),
                stage,
                failure.message
            ),
            None => println!("{}: failed: {}", failure.path.display(), failure.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploads(dir: &Path, max_file_size: u64) -> UploadConfig {
        UploadConfig {
            dir: dir.to_path_buf(),
            max_file_size,
        }
    }

    #[tokio::test]
    async fn test_accept_upload_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let accepted = accept_upload(&path, &uploads(dir.path(), 1024), false)
            .await
            .unwrap();

        assert_eq!(accepted, path);
    }

    #[tokio::test]
    async fn test_accept_upload_stages_copy() {
        let source = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let path = source.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let staged = accept_upload(&path, &uploads(staging.path(), 1024), true)
            .await
            .unwrap();

        assert!(staged.starts_with(staging.path()));
        assert!(staged.to_string_lossy().ends_with("-notes.txt"));
        assert_eq!(std::fs::read_to_string(staged).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_accept_upload_rejects_empty_and_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.txt");
        let large = dir.path().join("large.txt");
        std::fs::write(&empty, "").unwrap();
        std::fs::write(&large, "x".repeat(2048)).unwrap();

        let config = uploads(dir.path(), 1024);

        assert!(matches!(
            accept_upload(&empty, &config, false).await,
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            accept_upload(&large, &config, false).await,
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            accept_upload(dir.path(), &config, false).await,
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_ingest_reports_rejected_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.txt");
        let empty = dir.path().join("empty.txt");
        std::fs::write(&good, "A short paragraph of text.").unwrap();
        std::fs::write(&empty, "").unwrap();

        let mut config = AppConfig::default();
        config.uploads.dir = dir.path().to_path_buf();

        let args = IngestArgs {
            files: vec![good, empty],
            json: false,
            stage: false,
            concurrency: Some(2),
        };

        let batch = ingest(&config, &args).await.unwrap();

        assert_eq!(batch.results.len(), 1);
        assert_eq!(batch.results[0].created, 1);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].stage, None);
    }
}
