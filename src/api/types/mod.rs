//! Request and response types of the JSON API

pub mod error;
pub mod instance;
pub mod json;
pub mod pipeline;

pub use error::{ApiError, ApiErrorResponse};
pub use instance::{
    AssignRequest, CreateInstanceBody, InstanceListResponse, InstanceResponse, ListInstancesQuery,
    SetPendingItemsRequest, TransitionRequest,
};
pub use json::Json;
pub use pipeline::{
    BoardColumn, BoardResponse, ChecklistResponse, PipelineListResponse, PipelineResponse, StageResponse,
};
