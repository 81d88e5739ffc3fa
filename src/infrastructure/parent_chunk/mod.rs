//! Parent chunk infrastructure module
//!
//! Repository implementations for parent chunks (in-memory and PostgreSQL)
//! and the service used to browse and edit them.

mod in_memory;
mod postgres;
mod service;

pub use in_memory::InMemoryParentChunkRepository;
pub use postgres::PostgresParentChunkRepository;
pub use service::{ParentChunkService, DEFAULT_PAGE_LIMIT};
