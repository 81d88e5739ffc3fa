//! CLI module for notebook-ingest
//!
//! Provides subcommands:
//! - `ingest`: split documents into parent/child chunks and store the parents
//! - `detect`: report the detected document type of a file
//! - `chunks`: list, show and delete stored parent chunks
//! - `migrate`: apply or revert the PostgreSQL schema

pub mod chunks;
pub mod detect;
pub mod ingest;
pub mod migrate;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// notebook-ingest - Document ingestion into deduplicated parent/child chunks
#[derive(Parser)]
#[command(name = "notebook-ingest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ingest one or more documents
    Ingest(ingest::IngestArgs),

    /// Detect the document type of a file
    Detect(detect::DetectArgs),

    /// Inspect stored parent chunks
    ///
    /// Needs `storage.backend = "postgres"`: the in-memory store starts empty
    /// in every process.
    #[command(subcommand)]
    Chunks(chunks::ChunksCommand),

    /// Apply (or revert) the PostgreSQL schema
    Migrate(migrate::MigrateArgs),
}

/// Load `.env` and configuration, validate it and install logging
pub fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);
    config.validate()?;

    Ok(config)
}
