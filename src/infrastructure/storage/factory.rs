//! Storage factory for runtime backend selection

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::storage::{Storage, StorageEntity};
use crate::domain::DomainError;

use super::in_memory::InMemoryStorage;
use super::postgres::{PostgresConfig, PostgresStorage};

/// Supported storage backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    #[serde(alias = "in_memory", alias = "inmemory")]
    Memory,
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
}

/// Resolved storage settings
#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Postgres(PostgresConfig),
}

impl StorageConfig {
    /// Builds the settings for `backend`; postgres requires a URL
    pub fn from_backend(
        backend: StorageBackend,
        database_url: Option<&str>,
        max_connections: u32,
    ) -> Result<Self, DomainError> {
        match backend {
            StorageBackend::Memory => Ok(Self::InMemory),
            StorageBackend::Postgres => {
                let url = database_url.filter(|u| !u.trim().is_empty()).ok_or_else(|| {
                    DomainError::configuration("storage.database_url is required for postgres")
                })?;
                Ok(Self::Postgres(
                    PostgresConfig::new(url).with_max_connections(max_connections),
                ))
            }
        }
    }

    pub fn backend(&self) -> StorageBackend {
        match self {
            Self::InMemory => StorageBackend::Memory,
            Self::Postgres(_) => StorageBackend::Postgres,
        }
    }
}

#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    pub async fn create<E>(
        config: &StorageConfig,
        table_name: &str,
    ) -> Result<Arc<dyn Storage<E>>, DomainError>
    where
        E: StorageEntity + 'static,
    {
        match config {
            StorageConfig::InMemory => {
                info!("Using in-memory instance store");
                Ok(Arc::new(InMemoryStorage::<E>::new()))
            }
            StorageConfig::Postgres(pg_config) => {
                info!(table = table_name, "Using PostgreSQL instance store");
                let storage = PostgresStorage::<E>::connect(pg_config, table_name).await?;
                storage.ensure_table().await?;
                Ok(Arc::new(storage))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkflowInstance;

    #[test]
    fn test_backend_deserializes_with_aliases() {
        let b: StorageBackend = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(b, StorageBackend::Memory);
        let b: StorageBackend = serde_json::from_str("\"pg\"").unwrap();
        assert_eq!(b, StorageBackend::Postgres);
        assert!(serde_json::from_str::<StorageBackend>("\"redis\"").is_err());
    }

    #[test]
    fn test_postgres_requires_url() {
        let result = StorageConfig::from_backend(StorageBackend::Postgres, None, 5);
        assert!(matches!(result, Err(DomainError::Configuration { .. })));

        let config =
            StorageConfig::from_backend(StorageBackend::Postgres, Some("postgres://db/x"), 5)
                .unwrap();
        assert_eq!(config.backend(), StorageBackend::Postgres);
    }

    #[tokio::test]
    async fn test_create_in_memory() {
        let storage = StorageFactory::create::<WorkflowInstance>(
            &StorageConfig::InMemory,
            super::super::INSTANCES_TABLE,
        )
        .await
        .unwrap();

        assert_eq!(storage.count().await.unwrap(), 0);
    }
}
