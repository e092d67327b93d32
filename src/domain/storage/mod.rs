//! Storage domain - persistence contract for workflow instances

mod entity;
mod repository;

pub use entity::{StorageEntity, StorageKey};
pub use repository::Storage;
pub(crate) use repository::stale_write;

#[cfg(test)]
pub use repository::mock;
