//! FIDC Pipelines
//!
//! Stage-gated workflow engine for the operational pipelines of a
//! receivables fund:
//! - Originators onboarding, receivables acquisition, allocation and monitoring
//! - Checklist-gated forward transitions with SLA tracking
//! - In-memory or PostgreSQL instance storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use domain::{PipelineCatalog, TransitionEngine, WorkflowInstance};
use infrastructure::{
    checklist::{ChecklistRegistry, HttpChecklistConfig, HttpChecklistSource},
    services::{seed_demo_data, InstanceService},
    storage::{StorageBackend, StorageConfig, StorageFactory, INSTANCES_TABLE},
};
use tracing::info;

/// Application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Wires catalog, checklist registry, storage and the instance service
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let catalog = Arc::new(PipelineCatalog::builtin()?);
    let checklists = Arc::new(create_checklist_registry(config, catalog.clone())?);

    let database_url = config
        .storage
        .database_url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok());

    let storage_config = StorageConfig::from_backend(
        config.storage.backend,
        database_url.as_deref(),
        config.storage.max_connections,
    )?;
    let storage = StorageFactory::create::<WorkflowInstance>(&storage_config, INSTANCES_TABLE).await?;

    let engine =
        TransitionEngine::new(catalog.clone()).with_forward_entry(config.workflow.forward_entry);
    info!(forward_entry = ?config.workflow.forward_entry, "Transition engine ready");

    let service = Arc::new(InstanceService::new(storage, engine, checklists.clone()));

    if config.workflow.seed_demo_data && storage_config.backend() == StorageBackend::Memory {
        let created = seed_demo_data(service.as_ref()).await?;
        info!(created, "Seeded demo instances");
    }

    Ok(AppState::new(service, catalog, checklists))
}

fn create_checklist_registry(
    config: &AppConfig,
    catalog: Arc<PipelineCatalog>,
) -> anyhow::Result<ChecklistRegistry> {
    let registry = ChecklistRegistry::new(catalog);

    let Some(url) = config.checklist.remote_url.as_deref().filter(|u| !u.trim().is_empty()) else {
        info!("Using built-in checklists");
        return Ok(registry);
    };

    let source = HttpChecklistSource::new(
        HttpChecklistConfig::new(url)
            .with_timeout(Duration::from_millis(config.checklist.timeout_ms)),
    )?;
    info!(url, "Using remote checklists with built-in fallback");

    Ok(registry.with_remote(
        Arc::new(source),
        Duration::from_secs(config.checklist.cache_ttl_secs),
    ))
}
