//! Pipeline configuration errors

use thiserror::Error;

use crate::domain::DomainError;

/// Errors raised while building or querying pipeline definitions
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    #[error("Unknown pipeline kind: {0}")]
    UnknownKind(String),

    #[error("Unknown stage '{stage}' for pipeline {kind}")]
    UnknownStage { kind: String, stage: String },

    #[error("Pipeline {0} has no stages")]
    EmptyPipeline(String),

    #[error("Duplicate stage '{stage}' in pipeline {kind}")]
    DuplicateStage { kind: String, stage: String },

    #[error("First stage of pipeline {0} cannot be terminal")]
    TerminalFirstStage(String),

    #[error("Missing definition for pipeline {0}")]
    MissingDefinition(String),
}

impl PipelineError {
    pub fn unknown_stage(kind: impl Into<String>, stage: impl Into<String>) -> Self {
        Self::UnknownStage {
            kind: kind.into(),
            stage: stage.into(),
        }
    }
}

impl From<PipelineError> for DomainError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::UnknownKind(_) | PipelineError::UnknownStage { .. } => {
                DomainError::validation(err.to_string())
            }
            _ => DomainError::configuration(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::unknown_stage("receivables", "nowhere");
        assert_eq!(
            err.to_string(),
            "Unknown stage 'nowhere' for pipeline receivables"
        );
    }

    #[test]
    fn test_conversion_to_domain_error() {
        let err: DomainError = PipelineError::unknown_stage("allocation", "x").into();
        assert!(matches!(err, DomainError::Validation { .. }));

        let err: DomainError = PipelineError::EmptyPipeline("monitoring".into()).into();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
