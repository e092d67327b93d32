//! HTTP handlers for pipelines and instances

pub mod instances;
pub mod pipelines;

use crate::api::types::ApiError;
use crate::domain::{DomainError, PipelineKind};

/// Unknown kinds in the path surface as 404
pub(crate) fn parse_kind(kind: &str) -> Result<PipelineKind, ApiError> {
    kind.parse::<PipelineKind>()
        .map_err(|_| ApiError::from(DomainError::not_found(format!("Unknown pipeline '{}'", kind))))
}
