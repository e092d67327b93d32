//! Storage trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

use super::entity::StorageEntity;

/// Persistence contract for versioned entities.
///
/// Every backend error surfaces as `DomainError::Storage` so callers can
/// tell an outage apart from a business rejection.
#[async_trait]
pub trait Storage<E>: Send + Sync + Debug
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError>;

    async fn list(&self) -> Result<Vec<E>, DomainError>;

    /// Inserts a new entity; fails with `Conflict` if the key exists
    async fn create(&self, entity: E) -> Result<E, DomainError>;

    /// Replaces the stored entity if its version still equals `expected_version`.
    ///
    /// Fails with `NotFound` when the key is gone and `StaleWrite` when another
    /// writer got there first.
    async fn update(&self, entity: E, expected_version: u64) -> Result<E, DomainError>;

    /// Removes an entity, returning whether it existed
    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError>;

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list().await?.len())
    }
}

/// Error for an update whose `expected_version` no longer matches the store
pub(crate) fn stale_write(key: &str, expected: u64) -> DomainError {
    DomainError::stale_write(format!(
        "Instance '{}' was modified concurrently (expected version {})",
        key, expected
    ))
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::storage::StorageKey;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-process store with switchable failures
    #[derive(Debug)]
    pub struct MockStorage<E>
    where
        E: StorageEntity,
    {
        entities: Mutex<HashMap<String, E>>,
        error: Mutex<Option<String>>,
        write_error: Mutex<Option<String>>,
    }

    impl<E> Default for MockStorage<E>
    where
        E: StorageEntity,
    {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<E> MockStorage<E>
    where
        E: StorageEntity,
    {
        pub fn new() -> Self {
            Self {
                entities: Mutex::new(HashMap::new()),
                error: Mutex::new(None),
                write_error: Mutex::new(None),
            }
        }

        pub fn with_entity(self, entity: E) -> Self {
            self.entities
                .lock()
                .unwrap()
                .insert(entity.key().as_str().to_string(), entity);
            self
        }

        /// Every call fails
        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.error.lock().unwrap() = Some(error.into());
            self
        }

        /// Reads succeed, writes fail
        pub fn with_write_error(self, error: impl Into<String>) -> Self {
            *self.write_error.lock().unwrap() = Some(error.into());
            self
        }

        /// Snapshot of a stored entity, bypassing error injection
        pub fn stored(&self, key: &str) -> Option<E> {
            self.entities.lock().unwrap().get(key).cloned()
        }

        fn check_error(&self) -> Result<(), DomainError> {
            if let Some(error) = self.error.lock().unwrap().clone() {
                return Err(DomainError::storage(error));
            }
            Ok(())
        }

        fn check_write_error(&self) -> Result<(), DomainError> {
            self.check_error()?;
            if let Some(error) = self.write_error.lock().unwrap().clone() {
                return Err(DomainError::storage(error));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl<E> Storage<E> for MockStorage<E>
    where
        E: StorageEntity + 'static,
    {
        async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
            self.check_error()?;
            Ok(self.entities.lock().unwrap().get(key.as_str()).cloned())
        }

        async fn list(&self) -> Result<Vec<E>, DomainError> {
            self.check_error()?;
            Ok(self.entities.lock().unwrap().values().cloned().collect())
        }

        async fn create(&self, entity: E) -> Result<E, DomainError> {
            self.check_write_error()?;
            let key = entity.key().as_str().to_string();
            let mut entities = self.entities.lock().unwrap();

            if entities.contains_key(&key) {
                return Err(DomainError::conflict(format!(
                    "Instance '{}' already exists",
                    key
                )));
            }

            entities.insert(key, entity.clone());
            Ok(entity)
        }

        async fn update(&self, entity: E, expected_version: u64) -> Result<E, DomainError> {
            self.check_write_error()?;
            let key = entity.key().as_str().to_string();
            let mut entities = self.entities.lock().unwrap();

            let current = entities
                .get(&key)
                .ok_or_else(|| DomainError::not_found(format!("Instance '{}' not found", key)))?;

            if current.version() != expected_version {
                return Err(stale_write(&key, expected_version));
            }

            entities.insert(key, entity.clone());
            Ok(entity)
        }

        async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
            self.check_write_error()?;
            Ok(self.entities.lock().unwrap().remove(key.as_str()).is_some())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::domain::instance::{InstanceId, WorkflowInstance};
        use crate::domain::pipeline::PipelineKind;
        use chrono::Utc;

        fn instance(id: &str) -> WorkflowInstance {
            WorkflowInstance::new(
                InstanceId::new(id).unwrap(),
                PipelineKind::Monitoring,
                "ativo",
                vec!["Conciliação de pagamentos do período".to_string()],
                Utc::now(),
            )
        }

        #[tokio::test]
        async fn test_create_conflict() {
            let storage = MockStorage::new().with_entity(instance("mon-1"));

            let result = storage.create(instance("mon-1")).await;
            assert!(matches!(result, Err(DomainError::Conflict { .. })));
        }

        #[tokio::test]
        async fn test_update_checks_version() {
            let original = instance("mon-1");
            let storage = MockStorage::new().with_entity(original.clone());

            let mut next = original.clone();
            next.set_pending_items(vec![], Utc::now());
            assert_eq!(next.version(), 2);

            let stale = storage.update(next.clone(), 7).await;
            assert!(matches!(stale, Err(DomainError::StaleWrite { .. })));

            let saved = storage.update(next, 1).await.unwrap();
            assert_eq!(saved.version(), 2);
            assert!(storage.stored("mon-1").unwrap().pending_items().is_empty());
        }

        #[tokio::test]
        async fn test_update_missing_is_not_found() {
            let storage: MockStorage<WorkflowInstance> = MockStorage::new();
            let result = storage.update(instance("mon-9"), 1).await;
            assert!(matches!(result, Err(DomainError::NotFound { .. })));
        }

        #[tokio::test]
        async fn test_delete_and_count() {
            let storage = MockStorage::new()
                .with_entity(instance("mon-1"))
                .with_entity(instance("mon-2"));

            assert_eq!(storage.count().await.unwrap(), 2);
            assert!(storage.delete(&InstanceId::new("mon-1").unwrap()).await.unwrap());
            assert!(!storage.delete(&InstanceId::new("mon-1").unwrap()).await.unwrap());
            assert!(!storage.exists(&InstanceId::new("mon-1").unwrap()).await.unwrap());
        }

        #[tokio::test]
        async fn test_error_injection() {
            let storage = MockStorage::new()
                .with_entity(instance("mon-1"))
                .with_write_error("disk full");

            assert!(storage.get(&InstanceId::new("mon-1").unwrap()).await.unwrap().is_some());
            let result = storage.update(instance("mon-1"), 1).await;
            assert!(matches!(result, Err(DomainError::Storage { .. })));

            let failing: MockStorage<WorkflowInstance> = MockStorage::new().with_error("down");
            assert!(failing.list().await.unwrap_err().is_retryable());
        }
    }
}
