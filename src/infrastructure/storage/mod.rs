//! Storage infrastructure - Storage implementations

mod factory;
mod in_memory;
pub mod migrations;
mod postgres;

pub use factory::{StorageBackend, StorageConfig, StorageFactory, StorageType};
pub use in_memory::InMemoryStorage;
pub use migrations::{
    revert_last_storage_migration, run_storage_migrations, Migration, PostgresMigrator,
    OPTIONS_TABLE,
};
pub use postgres::{PostgresConfig, PostgresStorage};
