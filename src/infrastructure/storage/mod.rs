//! Storage infrastructure - Connection pooling, migrations and backend selection

mod factory;
pub mod migrations;
mod postgres;

pub use factory::{StorageConfig, StorageFactory, StorageType};
pub use migrations::{
    revert_storage_migration, run_storage_migrations, storage_migrations, Migration,
    PostgresMigrator,
};
pub use postgres::{connect_pool, PostgresConfig};
