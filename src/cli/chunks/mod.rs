//! Chunks command - browse and delete stored parent chunks

use std::sync::Arc;

use clap::{Args, Subcommand};
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::parent_chunk::{ParentChunk, ParentChunkRepository};
use crate::infrastructure::parent_chunk::{ParentChunkService, DEFAULT_PAGE_LIMIT};
use crate::infrastructure::storage::{StorageFactory, StorageType};

#[derive(Subcommand, Debug)]
pub enum ChunksCommand {
    /// List stored parent chunks
    List(ListArgs),

    /// Show one parent chunk as JSON
    Get {
        /// Parent chunk ID
        id: String,
    },

    /// Delete one parent chunk
    Delete {
        /// Parent chunk ID
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Number of chunks to skip
    #[arg(long, default_value_t = 0)]
    pub skip: usize,

    /// Maximum number of chunks to show
    #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
    pub limit: usize,

    /// Order by insertion time instead of chunk index
    #[arg(long)]
    pub unordered: bool,

    /// Print the chunks as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(command: ChunksCommand) -> anyhow::Result<()> {
    let config = crate::cli::bootstrap()?;
    let service = service(&config).await?;

    match command {
        ChunksCommand::List(args) => {
            let chunks = service.list(args.skip, args.limit, !args.unordered).await?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&chunks)?);
            } else {
                for chunk in &chunks {
                    println!("{}", summary_line(chunk));
                }
                println!("{} of {} chunks", chunks.len(), service.count().await?);
            }
        }
        ChunksCommand::Get { id } => {
            let chunk = service.get(&id).await?;
            println!("{}", serde_json::to_string_pretty(&chunk)?);
        }
        ChunksCommand::Delete { id } => {
            service.delete(&id).await?;
            println!("Deleted parent chunk {}", id);
        }
    }

    Ok(())
}

async fn service(
    config: &AppConfig,
) -> anyhow::Result<ParentChunkService<dyn ParentChunkRepository>> {
    if let Some(notice) = ephemeral_store_notice(config) {
        warn!("{}", notice);
    }

    let repository: Arc<dyn ParentChunkRepository> =
        StorageFactory::create_parent_chunk_repository(&config.storage.storage_config()).await?;

    Ok(ParentChunkService::new(repository))
}

/// Warning for backends that cannot hold chunks from an earlier run
fn ephemeral_store_notice(config: &AppConfig) -> Option<String> {
    match config.storage.backend {
        StorageType::InMemory => Some(format!(
            "Storage backend '{}' keeps no chunks between runs; set storage.backend = \"postgres\" to browse ingested chunks",
            StorageType::InMemory
        )),
        StorageType::Postgres => None,
    }
}

fn summary_line(chunk: &ParentChunk) -> String {
    let preview: String = chunk
        .content()
        .chars()
        .take(60)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    format!(
        "{}  #{:<4} {:>6} chars  {}  {}",
        chunk.id(),
        chunk.chunk_index(),
        chunk.char_count(),
        &chunk.content_hash()[..12],
        preview
    )
}
