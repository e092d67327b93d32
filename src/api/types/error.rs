//! API error envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, PipelineKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    NotFoundError,
    ConflictError,
    /// Business-rule rejection of a forward move
    GuardViolation,
    ServerError,
    ServiceUnavailableError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ConflictError => write!(f, "conflict_error"),
            Self::GuardViolation => write!(f, "guard_violation"),
            Self::ServerError => write!(f, "server_error"),
            Self::ServiceUnavailableError => write!(f, "service_unavailable_error"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// True when the same request may succeed later unchanged
    #[serde(default)]
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outstanding_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<PipelineKind>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    param: None,
                    code: None,
                    retryable: false,
                    outstanding_items: None,
                    pipeline: None,
                },
            },
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.response.error.param = Some(param.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiErrorType::ConflictError, message)
    }

    /// Lost a concurrent update; the client should reload and resend
    pub fn stale_write(message: impl Into<String>) -> Self {
        let mut err = Self::conflict(message).with_code("stale_write");
        err.response.error.retryable = true;
        err
    }

    pub fn guard_violation(pipeline: PipelineKind, outstanding: usize, message: impl Into<String>) -> Self {
        let mut err = Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            ApiErrorType::GuardViolation,
            message,
        );
        err.response.error.outstanding_items = Some(outstanding);
        err.response.error.pipeline = Some(pipeline);
        err
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        let mut err = Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorType::ServiceUnavailableError,
            message,
        );
        err.response.error.retryable = true;
        err
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();

        match err {
            DomainError::NotFound { .. } => Self::not_found(message),
            DomainError::Validation { .. } => Self::bad_request(message),
            DomainError::InvalidId { .. } => Self::bad_request(message).with_param("id"),
            DomainError::Conflict { .. } => Self::conflict(message),
            DomainError::StaleWrite { .. } => {
                tracing::info!(error = %message, "Concurrent update rejected");
                Self::stale_write(message)
            }
            DomainError::GuardViolation {
                pipeline,
                outstanding,
            } => Self::guard_violation(pipeline, outstanding, message)
                .with_code("pending_checklist_items"),
            DomainError::Storage { .. } | DomainError::Upstream { .. } => {
                tracing::warn!(error = %message, "Dependency unavailable");
                Self::unavailable(message)
            }
            DomainError::Configuration { .. } | DomainError::Internal { .. } => {
                tracing::error!(error = %message, "Internal error");
                Self::internal(message)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_violation_mapping() {
        let api_err: ApiError = DomainError::guard_violation(PipelineKind::Receivables, 1).into();

        assert_eq!(api_err.status, StatusCode::UNPROCESSABLE_ENTITY);
        let detail = &api_err.response.error;
        assert_eq!(detail.error_type, ApiErrorType::GuardViolation);
        assert_eq!(detail.message, "1 item pendente no pipeline receivables");
        assert_eq!(detail.outstanding_items, Some(1));
        assert_eq!(detail.pipeline, Some(PipelineKind::Receivables));
        assert!(!detail.retryable);
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::validation("x"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_id("x"), StatusCode::BAD_REQUEST),
            (DomainError::conflict("x"), StatusCode::CONFLICT),
            (DomainError::storage("x"), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::upstream("x"), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (domain_err, status) in cases {
            let api_err: ApiError = domain_err.into();
            assert_eq!(api_err.status, status);
        }
    }

    #[test]
    fn test_storage_error_is_retryable() {
        let api_err: ApiError = DomainError::storage("connection refused").into();
        assert!(api_err.response.error.retryable);
        assert_eq!(api_err.response.error.error_type, ApiErrorType::ServiceUnavailableError);
    }

    #[test]
    fn test_stale_write_is_retryable_conflict() {
        let api_err: ApiError = DomainError::stale_write("expected version 1").into();

        assert_eq!(api_err.status, StatusCode::CONFLICT);
        let detail = &api_err.response.error;
        assert_eq!(detail.code.as_deref(), Some("stale_write"));
        assert!(detail.retryable);

        let business: ApiError = DomainError::conflict("not terminal").into();
        assert!(business.response.error.code.is_none());
        assert!(!business.response.error.retryable);
    }

    #[test]
    fn test_error_serialization_skips_empty_fields() {
        let err = ApiError::conflict("Instance 'x' is in non-terminal stage");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["type"], "conflict_error");
        assert_eq!(json["error"]["retryable"], false);
        assert!(json["error"].get("outstanding_items").is_none());
    }
}
