//! In-memory storage implementation

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::storage::{stale_write, Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

/// Thread-safe in-memory store. Data is lost when the process exits.
#[derive(Debug)]
pub struct InMemoryStorage<E>
where
    E: StorageEntity,
{
    entities: RwLock<HashMap<String, E>>,
}

impl<E> Default for InMemoryStorage<E>
where
    E: StorageEntity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStorage<E>
where
    E: StorageEntity,
{
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_entities(entities: Vec<E>) -> Self {
        let map = entities
            .into_iter()
            .map(|e| (e.key().as_str().to_string(), e))
            .collect();

        Self {
            entities: RwLock::new(map),
        }
    }
}

fn poisoned(e: impl std::fmt::Display) -> DomainError {
    DomainError::storage(format!("Storage lock poisoned: {}", e))
}

#[async_trait]
impl<E> Storage<E> for InMemoryStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        let entities = self.entities.read().map_err(poisoned)?;
        Ok(entities.get(key.as_str()).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let entities = self.entities.read().map_err(poisoned)?;
        Ok(entities.values().cloned().collect())
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entities = self.entities.write().map_err(poisoned)?;

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
        let key = entity.key().as_str().to_string();
        let mut entities = self.entities.write().map_err(poisoned)?;

        let stored_version = entities
            .get(&key)
            .map(StorageEntity::version)
            .ok_or_else(|| DomainError::not_found(format!("Instance '{}' not found", key)))?;

        if stored_version != expected_version {
            return Err(stale_write(&key, expected_version));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        let mut entities = self.entities.write().map_err(poisoned)?;
        Ok(entities.remove(key.as_str()).is_some())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let entities = self.entities.read().map_err(poisoned)?;
        Ok(entities.len())
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        let entities = self.entities.read().map_err(poisoned)?;
        Ok(entities.contains_key(key.as_str()))
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
            PipelineKind::Allocation,
            "proposta",
            vec!["Valor e prazo definidos".to_string()],
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let storage = InMemoryStorage::new();
        let inst = instance("alloc-1");

        storage.create(inst.clone()).await.unwrap();

        let found = storage.get(inst.id()).await.unwrap();
        assert_eq!(found, Some(inst));
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let storage = InMemoryStorage::new();
        storage.create(instance("alloc-1")).await.unwrap();

        let result = storage.create(instance("alloc-1")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_with_current_version() {
        let storage = InMemoryStorage::with_entities(vec![instance("alloc-1")]);
        let mut inst = storage
            .get(&InstanceId::new("alloc-1").unwrap())
            .await
            .unwrap()
            .unwrap();

        let expected = inst.version();
        inst.assign(Some("ana".to_string()), Utc::now());
        storage.update(inst, expected).await.unwrap();

        let stored = storage
            .get(&InstanceId::new("alloc-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.assigned_to(), Some("ana"));
        assert_eq!(stored.version(), 2);
    }

    #[tokio::test]
    async fn test_stale_update_is_retryable_stale_write() {
        let storage = InMemoryStorage::with_entities(vec![instance("alloc-1")]);

        let mut first = instance("alloc-1");
        first.assign(Some("ana".to_string()), Utc::now());
        storage.update(first, 1).await.unwrap();

        let mut second = instance("alloc-1");
        second.assign(Some("bruno".to_string()), Utc::now());
        let err = storage.update(second, 1).await.unwrap_err();

        assert!(matches!(err, DomainError::StaleWrite { .. }));
        assert!(err.is_retryable());

        let stored = storage
            .get(&InstanceId::new("alloc-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.assigned_to(), Some("ana"));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let storage: InMemoryStorage<WorkflowInstance> = InMemoryStorage::new();
        let result = storage.update(instance("ghost"), 1).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_list_count() {
        let storage =
            InMemoryStorage::with_entities(vec![instance("alloc-1"), instance("alloc-2")]);

        assert_eq!(storage.count().await.unwrap(), 2);
        assert!(storage.delete(&InstanceId::new("alloc-1").unwrap()).await.unwrap());
        assert!(!storage.delete(&InstanceId::new("alloc-1").unwrap()).await.unwrap());
        assert_eq!(storage.list().await.unwrap().len(), 1);
        assert!(!storage.exists(&InstanceId::new("alloc-1").unwrap()).await.unwrap());
    }
}
