//! Client-side reconciliation of optimistic moves.
//!
//! A board client moves a card before the server answers. Once the command
//! result arrives, [`reconcile`] decides what the client must do with the
//! tentative state.

use serde::Serialize;

use super::error::DomainError;
use super::instance::{InstanceId, WorkflowInstance};

/// A stage change already applied locally, awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticMove {
    pub instance_id: InstanceId,
    pub from_stage: String,
    pub to_stage: String,
}

impl OptimisticMove {
    pub fn new(
        instance_id: InstanceId,
        from_stage: impl Into<String>,
        to_stage: impl Into<String>,
    ) -> Self {
        Self {
            instance_id,
            from_stage: from_stage.into(),
            to_stage: to_stage.into(),
        }
    }
}

/// What the client does with its tentative state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Reconciliation {
    /// Keep the move; replace local state with the server's instance
    Confirm { instance: Box<WorkflowInstance> },
    /// Put the card back and show `reason` to the user
    Revert { to_stage: String, reason: String },
    /// The instance no longer exists; drop it from the view
    Remove,
    /// Transient failure or lost version race; the move is neither confirmed nor rejected
    Retry { reason: String },
}

pub fn reconcile(
    pending: &OptimisticMove,
    outcome: Result<WorkflowInstance, DomainError>,
) -> Reconciliation {
    match outcome {
        Ok(instance) => Reconciliation::Confirm {
            instance: Box::new(instance),
        },
        Err(DomainError::NotFound { .. }) => Reconciliation::Remove,
        Err(err) if err.is_retryable() => Reconciliation::Retry {
            reason: err.to_string(),
        },
        Err(err) => Reconciliation::Revert {
            to_stage: pending.from_stage.clone(),
            reason: err.to_string(),
        },
    }
}
