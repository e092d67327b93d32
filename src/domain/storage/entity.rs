//! Storage entity traits

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

/// Key of a stored entity
pub trait StorageKey: Clone + Debug + Send + Sync + Eq + std::hash::Hash {
    /// String form used by backends keyed on text
    fn as_str(&self) -> &str;
}

/// A versioned entity persisted as a JSON document
pub trait StorageEntity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned {
    type Key: StorageKey;

    fn key(&self) -> &Self::Key;

    /// Monotonic revision, bumped by every mutation of the entity
    fn version(&self) -> u64;
}
