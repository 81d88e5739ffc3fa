//! Migrate command - manages the PostgreSQL schema

use clap::Args;

use crate::infrastructure::storage::{
    connect_pool, revert_storage_migration, run_storage_migrations, StorageType,
};

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Revert the latest applied migration instead of applying pending ones
    #[arg(long)]
    pub revert: bool,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = crate::cli::bootstrap()?;

    if config.storage.backend != StorageType::Postgres {
        anyhow::bail!(
            "migrations need the postgres storage backend (configured: {})",
            config.storage.backend
        );
    }

    let pool = connect_pool(&config.storage.postgres).await?;

    let version = if args.revert {
        revert_storage_migration(&pool).await?
    } else {
        run_storage_migrations(&pool).await?
    };

    match version {
        Some(version) => println!("Schema at version {}", version),
        None => println!("No migrations applied"),
    }

    Ok(())
}
