//! Storage infrastructure - instance store backends

mod factory;
mod in_memory;
mod postgres;

pub use factory::{StorageBackend, StorageConfig, StorageFactory};
pub use in_memory::InMemoryStorage;
pub use postgres::{PostgresConfig, PostgresStorage, INSTANCES_TABLE};
