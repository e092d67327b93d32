//! Domain layer - pipelines, checklists, instances and the transition engine

pub mod caller;
pub mod checklist;
pub mod error;
pub mod instance;
pub mod pipeline;
pub mod reconcile;
pub mod storage;
pub mod transition;

pub use caller::CallerIdentity;
pub use checklist::{builtin_checklist, ChecklistSource, ChecklistTable};
pub use error::{pending_label, DomainError};
pub use instance::{
    remaining_days, validate_instance_id, AssigneeFilter, InstanceFilter, InstanceId,
    InstancePage, Pagination, SlaBucket, WorkflowInstance, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use pipeline::{
    PipelineCatalog, PipelineDefinition, PipelineError, PipelineKind, StageDefinition,
    StageDirection,
};
pub use reconcile::{reconcile, OptimisticMove, Reconciliation};
pub use storage::{Storage, StorageEntity, StorageKey};
pub use transition::{stage_deadline, ForwardEntryPolicy, TransitionEngine, TransitionOutcome};
