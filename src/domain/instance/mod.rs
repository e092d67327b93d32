//! Workflow instance domain
//!
//! A workflow instance is the unit of work tracked by a pipeline. The engine
//! owns its record shape and the rules for mutating it; persistence goes
//! through the generic [`Storage`](crate::domain::storage::Storage) trait.

mod entity;
mod filter;

pub use entity::{validate_instance_id, InstanceId, WorkflowInstance, MAX_ID_LENGTH};
pub use filter::{
    remaining_days, AssigneeFilter, InstanceFilter, InstancePage, Pagination, SlaBucket,
    DEFAULT_LIMIT, MAX_LIMIT,
};
