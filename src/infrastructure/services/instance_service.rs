//! Instance service - lifecycle of workflow instances across all pipelines

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, instrument};

use crate::domain::{
    CallerIdentity, DomainError, InstanceFilter, InstanceId, InstancePage, Pagination,
    PipelineKind, SlaBucket, Storage, TransitionEngine, WorkflowInstance,
};
use crate::infrastructure::checklist::ChecklistRegistry;
use crate::infrastructure::observability::{record_guard_violation, record_transition};

/// Idle per-instance locks are pruned once the table grows past this size
const LOCK_TABLE_PRUNE_THRESHOLD: usize = 256;

/// Request to create a new instance at the first stage of a pipeline
#[derive(Debug, Clone, Default)]
pub struct CreateInstanceRequest {
    /// Explicit id; generated when absent
    pub id: Option<String>,
    pub attributes: Value,
    pub assigned_to: Option<String>,
    /// Overrides the deadline derived from the first stage's SLA
    pub sla_deadline: Option<DateTime<Utc>>,
}

/// New owner of an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignTarget {
    Owner(String),
    /// The identity making the request
    Caller,
    Nobody,
}

impl AssignTarget {
    /// Wire form: `null` unassigns, `"me"` means the caller, anything else is a name
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None => Self::Nobody,
            Some(v) if v.trim().eq_ignore_ascii_case("me") => Self::Caller,
            Some(v) => Self::Owner(v.to_string()),
        }
    }

    fn resolve(self, caller: Option<&CallerIdentity>) -> Result<Option<String>, DomainError> {
        match self {
            Self::Nobody => Ok(None),
            Self::Caller => caller
                .map(|c| Some(c.as_str().to_string()))
                .ok_or_else(|| DomainError::validation("Assigning to 'me' requires a caller identity")),
            Self::Owner(name) => Ok(Some(CallerIdentity::new(name)?.as_str().to_string())),
        }
    }
}

/// Column header of a kanban board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSummary {
    pub stage: String,
    pub label: String,
    pub terminal: bool,
    pub count: usize,
    pub overdue: usize,
}

/// Trait for instance service (for dynamic dispatch in AppState)
#[async_trait]
pub trait InstanceServiceTrait: Send + Sync + Debug {
    async fn create(
        &self,
        kind: PipelineKind,
        request: CreateInstanceRequest,
    ) -> Result<WorkflowInstance, DomainError>;

    async fn get(&self, id: &str) -> Result<WorkflowInstance, DomainError>;

    /// Filtered, paginated listing ordered by creation time
    async fn list(
        &self,
        kind: PipelineKind,
        filter: InstanceFilter,
        pagination: Pagination,
        caller: Option<&CallerIdentity>,
    ) -> Result<InstancePage, DomainError>;

    async fn transition(&self, id: &str, target_stage: &str)
        -> Result<WorkflowInstance, DomainError>;

    async fn set_pending_items(
        &self,
        id: &str,
        items: Vec<String>,
    ) -> Result<WorkflowInstance, DomainError>;

    async fn assign(
        &self,
        id: &str,
        target: AssignTarget,
        caller: Option<&CallerIdentity>,
    ) -> Result<WorkflowInstance, DomainError>;

    /// Removes an instance resting in a terminal stage
    async fn delete(&self, id: &str) -> Result<(), DomainError>;

    async fn board(&self, kind: PipelineKind) -> Result<Vec<StageSummary>, DomainError>;

    /// Number of stored instances across all pipelines
    async fn count(&self) -> Result<usize, DomainError>;
}

/// Instance service backed by a [`Storage`] and the transition engine.
///
/// Mutations on the same instance are serialized with an async lock per id;
/// the store's version check rejects writers from other processes.
pub struct InstanceService {
    storage: Arc<dyn Storage<WorkflowInstance>>,
    engine: TransitionEngine,
    checklists: Arc<ChecklistRegistry>,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Debug for InstanceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceService")
            .field("storage", &self.storage)
            .field("forward_entry", &self.engine.forward_entry())
            .finish()
    }
}

impl InstanceService {
    pub fn new(
        storage: Arc<dyn Storage<WorkflowInstance>>,
        engine: TransitionEngine,
        checklists: Arc<ChecklistRegistry>,
    ) -> Self {
        Self {
            storage,
            engine,
            checklists,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn parse_id(&self, id: &str) -> Result<InstanceId, DomainError> {
        InstanceId::new(id)
    }

    async fn load(&self, id: &InstanceId) -> Result<WorkflowInstance, DomainError> {
        self.storage
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Instance '{}' not found", id)))
    }

    async fn lock_instance(&self, id: &InstanceId) -> Result<OwnedMutexGuard<()>, DomainError> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|e| DomainError::internal(format!("Instance lock table poisoned: {}", e)))?;

            if locks.len() > LOCK_TABLE_PRUNE_THRESHOLD {
                locks.retain(|_, l| Arc::strong_count(l) > 1);
            }

            locks
                .entry(id.as_str().to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };

        Ok(lock.lock_owned().await)
    }

    fn release_lock_entry(&self, id: &InstanceId) {
        if let Ok(mut locks) = self.locks.lock() {
            locks.remove(id.as_str());
        }
    }

    async fn save(
        &self,
        updated: WorkflowInstance,
        previous: &WorkflowInstance,
    ) -> Result<WorkflowInstance, DomainError> {
        self.storage.update(updated, previous.version()).await
    }
}

#[async_trait]
impl InstanceServiceTrait for InstanceService {
    #[instrument(skip(self, request), fields(pipeline = %kind))]
    async fn create(
        &self,
        kind: PipelineKind,
        request: CreateInstanceRequest,
    ) -> Result<WorkflowInstance, DomainError> {
        let now = Utc::now();
        let first_stage = self.engine.catalog().first_stage(kind).id().to_string();
        let checklist = self.checklists.checklist_for(kind, &first_stage).await?;

        let id = match request.id {
            Some(id) => self.parse_id(&id)?,
            None => InstanceId::generate(),
        };

        let mut instance = self
            .engine
            .create(id, kind, request.attributes, &checklist, now)?;

        if let Some(owner) = request.assigned_to {
            let owner = AssignTarget::Owner(owner).resolve(None)?;
            instance = instance.with_assigned_to(owner);
        }

        if let Some(deadline) = request.sla_deadline {
            instance = instance.with_sla_deadline(Some(deadline));
        }

        let created = self.storage.create(instance).await?;
        info!(instance_id = %created.id(), stage = %created.current_stage(), "Created instance");

        Ok(created)
    }

    async fn get(&self, id: &str) -> Result<WorkflowInstance, DomainError> {
        let id = self.parse_id(id)?;
        self.load(&id).await
    }

    #[instrument(skip(self, filter, caller), fields(pipeline = %kind))]
    async fn list(
        &self,
        kind: PipelineKind,
        filter: InstanceFilter,
        pagination: Pagination,
        caller: Option<&CallerIdentity>,
    ) -> Result<InstancePage, DomainError> {
        let definition = self.engine.catalog().definition(kind);

        if let Some(stage) = &filter.stage {
            definition.stage(stage)?;
        }

        let filter = InstanceFilter {
            assignee: filter.assignee.resolve(caller)?,
            ..filter
        };

        let now = Utc::now();
        let segment_attribute = definition.segment_attribute();

        let mut items: Vec<WorkflowInstance> = self
            .storage
            .list()
            .await?
            .into_iter()
            .filter(|i| i.pipeline_kind() == kind)
            .filter(|i| filter.matches(i, segment_attribute, now))
            .collect();

        items.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });

        let page = pagination.apply(items);
        debug!(total = page.total, returned = page.items.len(), "Listed instances");

        Ok(page)
    }

    #[instrument(skip(self), fields(instance_id = %id))]
    async fn transition(
        &self,
        id: &str,
        target_stage: &str,
    ) -> Result<WorkflowInstance, DomainError> {
        let id = self.parse_id(id)?;
        let _guard = self.lock_instance(&id).await?;

        let current = self.load(&id).await?;
        let kind = current.pipeline_kind();
        let target_checklist = self.checklists.checklist_for(kind, target_stage).await?;

        let outcome = self
            .engine
            .transition(&current, target_stage, &target_checklist, Utc::now())
            .inspect_err(|e| {
                if e.is_guard_violation() {
                    record_guard_violation(kind);
                    info!(
                        stage = %current.current_stage(),
                        target = target_stage,
                        outstanding = current.pending_items().len(),
                        "Forward transition blocked by pending items"
                    );
                }
            })?;

        if outcome.is_noop() {
            debug!(stage = target_stage, "Transition to current stage ignored");
            return Ok(outcome.instance);
        }

        let direction = outcome.direction;
        let saved = self.save(outcome.instance, &current).await?;
        record_transition(kind, direction);

        info!(
            pipeline = %kind,
            from = %outcome.from_stage,
            to = %saved.current_stage(),
            direction = direction.as_str(),
            pending = saved.pending_items().len(),
            "Instance transitioned"
        );

        Ok(saved)
    }

    #[instrument(skip(self, items), fields(instance_id = %id, items = items.len()))]
    async fn set_pending_items(
        &self,
        id: &str,
        items: Vec<String>,
    ) -> Result<WorkflowInstance, DomainError> {
        let id = self.parse_id(id)?;
        let _guard = self.lock_instance(&id).await?;

        let current = self.load(&id).await?;
        let checklist = self
            .checklists
            .checklist_for(current.pipeline_kind(), current.current_stage())
            .await?;

        let updated = self
            .engine
            .set_pending_items(&current, &items, &checklist, Utc::now())?;
        let saved = self.save(updated, &current).await?;

        debug!(pending = saved.pending_items().len(), "Updated pending items");
        Ok(saved)
    }

    #[instrument(skip(self, caller), fields(instance_id = %id))]
    async fn assign(
        &self,
        id: &str,
        target: AssignTarget,
        caller: Option<&CallerIdentity>,
    ) -> Result<WorkflowInstance, DomainError> {
        let owner = target.resolve(caller)?;
        let id = self.parse_id(id)?;
        let _guard = self.lock_instance(&id).await?;

        let current = self.load(&id).await?;
        let mut updated = current.clone();
        updated.assign(owner, Utc::now());

        let saved = self.save(updated, &current).await?;
        info!(assigned_to = ?saved.assigned_to(), "Instance assigned");

        Ok(saved)
    }

    #[instrument(skip(self), fields(instance_id = %id))]
    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let id = self.parse_id(id)?;
        let guard = self.lock_instance(&id).await?;

        let current = self.load(&id).await?;
        self.engine.ensure_deletable(&current)?;

        if !self.storage.delete(&id).await? {
            return Err(DomainError::not_found(format!("Instance '{}' not found", id)));
        }

        drop(guard);
        self.release_lock_entry(&id);
        info!(stage = %current.current_stage(), "Deleted instance");

        Ok(())
    }

    async fn board(&self, kind: PipelineKind) -> Result<Vec<StageSummary>, DomainError> {
        let now = Utc::now();
        let instances: Vec<WorkflowInstance> = self
            .storage
            .list()
            .await?
            .into_iter()
            .filter(|i| i.pipeline_kind() == kind)
            .collect();

        let summaries = self
            .engine
            .catalog()
            .definition(kind)
            .stages()
            .iter()
            .map(|stage| {
                let in_stage = instances
                    .iter()
                    .filter(|i| i.current_stage() == stage.id());

                let (count, overdue) = in_stage.fold((0, 0), |(count, overdue), i| {
                    let late = i
                        .sla_deadline()
                        .is_some_and(|d| SlaBucket::classify(d, now) == SlaBucket::Overdue);
                    (count + 1, overdue + usize::from(late))
                });

                StageSummary {
                    stage: stage.id().to_string(),
                    label: stage.label().to_string(),
                    terminal: stage.is_terminal(),
                    count,
                    overdue,
                }
            })
            .collect();

        Ok(summaries)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        self.storage.count().await
    }
}
