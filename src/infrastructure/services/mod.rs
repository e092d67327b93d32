//! Infrastructure services

mod instance_service;
mod seed;

pub use instance_service::{
    AssignTarget, CreateInstanceRequest, InstanceService, InstanceServiceTrait, StageSummary,
};
pub use seed::seed_demo_data;
