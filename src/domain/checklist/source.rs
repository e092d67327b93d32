//! Checklist source trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::table::ChecklistTable;
use crate::domain::pipeline::PipelineKind;
use crate::domain::DomainError;

/// Provider of the authoritative checklist table for a pipeline kind
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChecklistSource: Send + Sync {
    /// Fetches the checklist table for a pipeline kind
    async fn fetch(&self, kind: PipelineKind) -> Result<ChecklistTable, DomainError>;

    /// Name used in logs
    fn source_name(&self) -> &'static str;
}
