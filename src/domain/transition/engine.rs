//! Transition engine - stage guards and checklist bookkeeping

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::instance::{InstanceId, WorkflowInstance};
use crate::domain::pipeline::{PipelineCatalog, PipelineKind, StageDefinition, StageDirection};
use crate::domain::DomainError;

/// What a forward move loads into the target stage's pending checklist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardEntryPolicy {
    /// The full checklist of the target stage becomes pending
    #[default]
    PopulateChecklist,
    /// Nothing is pending until the caller flags items
    Empty,
}

/// Result of an accepted transition
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub instance: WorkflowInstance,
    pub from_stage: String,
    pub direction: StageDirection,
}

impl TransitionOutcome {
    pub fn is_noop(&self) -> bool {
        self.direction == StageDirection::Same
    }
}

/// Config-driven state machine shared by every pipeline kind.
///
/// Forward moves require an empty pending checklist. Backward moves are
/// always allowed and reseed the landing stage's full checklist.
#[derive(Debug, Clone)]
pub struct TransitionEngine {
    catalog: Arc<PipelineCatalog>,
    forward_entry: ForwardEntryPolicy,
}

impl TransitionEngine {
    pub fn new(catalog: Arc<PipelineCatalog>) -> Self {
        Self {
            catalog,
            forward_entry: ForwardEntryPolicy::default(),
        }
    }

    pub fn with_forward_entry(mut self, policy: ForwardEntryPolicy) -> Self {
        self.forward_entry = policy;
        self
    }

    pub fn catalog(&self) -> &PipelineCatalog {
        &self.catalog
    }

    pub fn forward_entry(&self) -> ForwardEntryPolicy {
        self.forward_entry
    }

    /// Builds a new instance at the pipeline's first stage.
    ///
    /// `first_checklist` must be the checklist of that first stage.
    pub fn create(
        &self,
        id: InstanceId,
        kind: PipelineKind,
        attributes: Value,
        first_checklist: &[String],
        now: DateTime<Utc>,
    ) -> Result<WorkflowInstance, DomainError> {
        let definition = self.catalog.definition(kind);
        let attributes = validate_attributes(definition.required_attributes(), attributes)?;
        let first = definition.first_stage();

        Ok(WorkflowInstance::new(
            id,
            kind,
            first.id(),
            first_checklist.to_vec(),
            now,
        )
        .with_attributes(attributes)
        .with_sla_deadline(stage_deadline(first, now)))
    }

    /// Validates and applies a move to `target_stage`.
    ///
    /// `target_checklist` is the registry's checklist for the target stage.
    /// The input instance is never modified; on rejection the caller keeps it as-is.
    pub fn transition(
        &self,
        instance: &WorkflowInstance,
        target_stage: &str,
        target_checklist: &[String],
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, DomainError> {
        let kind = instance.pipeline_kind();
        let definition = self.catalog.definition(kind);
        let target = definition.stage(target_stage)?;
        let direction = definition.direction(instance.current_stage(), target_stage)?;
        let from_stage = instance.current_stage().to_string();

        let pending = match direction {
            StageDirection::Same => {
                return Ok(TransitionOutcome {
                    instance: instance.clone(),
                    from_stage,
                    direction,
                });
            }
            StageDirection::Forward => {
                if instance.has_pending_items() {
                    return Err(DomainError::guard_violation(
                        kind,
                        instance.pending_items().len(),
                    ));
                }

                match self.forward_entry {
                    ForwardEntryPolicy::PopulateChecklist => target_checklist.to_vec(),
                    ForwardEntryPolicy::Empty => Vec::new(),
                }
            }
            StageDirection::Backward => target_checklist.to_vec(),
        };

        let mut updated = instance.clone();
        updated.enter_stage(target.id(), pending, stage_deadline(target, now), now);

        Ok(TransitionOutcome {
            instance: updated,
            from_stage,
            direction,
        })
    }

    /// Overwrites the pending checklist of the current stage.
    ///
    /// Every item must belong to `stage_checklist`; the result is
    /// deduplicated and kept in checklist order.
    pub fn set_pending_items(
        &self,
        instance: &WorkflowInstance,
        items: &[String],
        stage_checklist: &[String],
        now: DateTime<Utc>,
    ) -> Result<WorkflowInstance, DomainError> {
        let unknown: Vec<&str> = items
            .iter()
            .filter(|item| !stage_checklist.contains(item))
            .map(String::as_str)
            .collect();

        if !unknown.is_empty() {
            return Err(DomainError::validation(format!(
                "Items not in the checklist of stage '{}': {}",
                instance.current_stage(),
                unknown.join(", ")
            )));
        }

        let pending = stage_checklist
            .iter()
            .filter(|item| items.contains(item))
            .cloned()
            .collect();

        let mut updated = instance.clone();
        updated.set_pending_items(pending, now);
        Ok(updated)
    }

    /// Deletion is restricted to instances resting in a terminal stage
    pub fn ensure_deletable(&self, instance: &WorkflowInstance) -> Result<(), DomainError> {
        let terminal = self
            .catalog
            .is_terminal(instance.pipeline_kind(), instance.current_stage())?;

        if !terminal {
            return Err(DomainError::conflict(format!(
                "Instance '{}' is in non-terminal stage '{}' and cannot be deleted",
                instance.id(),
                instance.current_stage()
            )));
        }

        Ok(())
    }
}

/// Deadline for an instance entering `stage` at `now`
pub fn stage_deadline(stage: &StageDefinition, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    stage.sla_days().map(|days| now + Duration::days(days))
}

fn validate_attributes(required: &[String], attributes: Value) -> Result<Map<String, Value>, DomainError> {
    let attributes = match attributes {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => {
            return Err(DomainError::validation("Attributes must be a JSON object"));
        }
    };

    let missing: Vec<&str> = required
        .iter()
        .filter(|key| is_blank(attributes.get(key.as_str())))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        return Err(DomainError::validation(format!(
            "Missing required attributes: {}",
            missing.join(", ")
        )));
    }

    Ok(attributes)
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}
