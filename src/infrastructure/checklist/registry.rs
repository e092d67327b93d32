//! Checklist registry - static tables with optional remote refresh

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, warn};

use crate::domain::{
    builtin_checklist, ChecklistSource, ChecklistTable, DomainError, PipelineCatalog, PipelineKind,
};
use crate::infrastructure::observability::record_checklist_fallback;

/// Answers `checklist_for(kind, stage)`.
///
/// Without a remote source the compiled-in tables are served. With one, the
/// remote table is cached for the configured TTL; a failed or invalid fetch
/// is replaced by the static table and never reported to the caller.
pub struct ChecklistRegistry {
    catalog: Arc<PipelineCatalog>,
    remote: Option<Arc<dyn ChecklistSource>>,
    cache: Cache<PipelineKind, Arc<ChecklistTable>>,
}

impl std::fmt::Debug for ChecklistRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecklistRegistry")
            .field("remote", &self.remote.as_ref().map(|r| r.source_name()))
            .field("cached", &self.cache.entry_count())
            .finish()
    }
}

impl ChecklistRegistry {
    pub fn new(catalog: Arc<PipelineCatalog>) -> Self {
        Self {
            catalog,
            remote: None,
            cache: Cache::builder().max_capacity(16).build(),
        }
    }

    pub fn with_remote(mut self, source: Arc<dyn ChecklistSource>, ttl: Duration) -> Self {
        self.remote = Some(source);
        self.cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(16)
            .build();
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Full checklist table of a pipeline kind
    pub async fn table(&self, kind: PipelineKind) -> Arc<ChecklistTable> {
        let Some(remote) = &self.remote else {
            return Arc::new(builtin_checklist(kind));
        };

        if let Some(cached) = self.cache.get(&kind).await {
            debug!(pipeline = %kind, "Checklist cache hit");
            return cached;
        }

        match self.fetch_remote(remote.as_ref(), kind).await {
            Ok(table) => {
                let table = Arc::new(table);
                self.cache.insert(kind, table.clone()).await;
                table
            }
            Err(e) => {
                warn!(
                    pipeline = %kind,
                    source = remote.source_name(),
                    error = %e,
                    "Remote checklist unavailable, using static table"
                );
                record_checklist_fallback(kind);
                Arc::new(builtin_checklist(kind))
            }
        }
    }

    /// Ordered items required at `stage`; unknown stages are a validation error
    pub async fn checklist_for(
        &self,
        kind: PipelineKind,
        stage: &str,
    ) -> Result<Vec<String>, DomainError> {
        self.catalog.stage(kind, stage)?;
        Ok(self.table(kind).await.items(stage).to_vec())
    }

    async fn fetch_remote(
        &self,
        remote: &dyn ChecklistSource,
        kind: PipelineKind,
    ) -> Result<ChecklistTable, DomainError> {
        let table = remote.fetch(kind).await?;
        table.validate_against(self.catalog.definition(kind))?;

        debug!(pipeline = %kind, stages = table.stage_count(), "Fetched remote checklist");
        Ok(table.merged_over(&builtin_checklist(kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checklist::MockChecklistSource;

    fn catalog() -> Arc<PipelineCatalog> {
        Arc::new(PipelineCatalog::builtin().unwrap())
    }

    fn remote(mock: MockChecklistSource) -> ChecklistRegistry {
        ChecklistRegistry::new(catalog()).with_remote(Arc::new(mock), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_static_registry_serves_builtin() {
        let registry = ChecklistRegistry::new(catalog());
        let items = registry
            .checklist_for(PipelineKind::Receivables, "recebido")
            .await
            .unwrap();

        assert_eq!(items, builtin_checklist(PipelineKind::Receivables).items("recebido"));
        assert!(!registry.has_remote());
    }

    #[tokio::test]
    async fn test_terminal_stage_has_empty_checklist() {
        let registry = ChecklistRegistry::new(catalog());
        let items = registry
            .checklist_for(PipelineKind::Allocation, "alocado")
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_stage_is_validation_error() {
        let registry = ChecklistRegistry::new(catalog());
        let result = registry.checklist_for(PipelineKind::Monitoring, "lead").await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_remote_table_is_cached_and_merged() {
        let mut mock = MockChecklistSource::new();
        mock.expect_fetch().times(1).returning(|_| {
            Ok(ChecklistTable::new().with_stage("recebido", ["Remessa conferida"]))
        });
        mock.expect_source_name().return_const("mock");

        let registry = remote(mock);

        for _ in 0..3 {
            let items = registry
                .checklist_for(PipelineKind::Receivables, "recebido")
                .await
                .unwrap();
            assert_eq!(items, vec!["Remessa conferida".to_string()]);
        }

        // Stages absent from the remote table come from the static one
        let validacao = registry
            .checklist_for(PipelineKind::Receivables, "validacao")
            .await
            .unwrap();
        assert_eq!(validacao, builtin_checklist(PipelineKind::Receivables).items("validacao"));
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_silently() {
        let mut mock = MockChecklistSource::new();
        mock.expect_fetch()
            .times(2)
            .returning(|_| Err(DomainError::upstream("connection refused")));
        mock.expect_source_name().return_const("mock");

        let registry = remote(mock);
        let expected = builtin_checklist(PipelineKind::Originators);

        // Failures are not cached
        for _ in 0..2 {
            let items = registry
                .checklist_for(PipelineKind::Originators, "comite")
                .await
                .unwrap();
            assert_eq!(items, expected.items("comite"));
        }
    }

    #[tokio::test]
    async fn test_remote_table_with_foreign_stage_rejected() {
        let mut mock = MockChecklistSource::new();
        mock.expect_fetch()
            .returning(|_| Ok(ChecklistTable::new().with_stage("liquidado_parcial", ["x"])));
        mock.expect_source_name().return_const("mock");

        let registry = remote(mock);
        let table = registry.table(PipelineKind::Receivables).await;

        assert_eq!(*table, builtin_checklist(PipelineKind::Receivables));
    }
}
