use thiserror::Error;

use super::pipeline::PipelineKind;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// An update lost the version check against a concurrent writer
    #[error("Stale write: {message}")]
    StaleWrite { message: String },

    /// Forward transition attempted while checklist items are still pending.
    #[error("{} no pipeline {pipeline}", pending_label(*outstanding))]
    GuardViolation {
        pipeline: PipelineKind,
        outstanding: usize,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Upstream error: {message}")]
    Upstream { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// "1 item pendente" / "3 itens pendentes"
pub fn pending_label(count: usize) -> String {
    if count == 1 {
        "1 item pendente".to_string()
    } else {
        format!("{} itens pendentes", count)
    }
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn stale_write(message: impl Into<String>) -> Self {
        Self::StaleWrite {
            message: message.into(),
        }
    }

    pub fn guard_violation(pipeline: PipelineKind, outstanding: usize) -> Self {
        Self::GuardViolation {
            pipeline,
            outstanding,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// System-level failures the client may retry. Business rejections are never retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Upstream { .. } | Self::StaleWrite { .. }
        )
    }

    pub fn is_guard_violation(&self) -> bool {
        matches!(self, Self::GuardViolation { .. })
    }
}
