//! Application state shared by handlers

use std::sync::Arc;

use crate::domain::PipelineCatalog;
use crate::infrastructure::checklist::ChecklistRegistry;
use crate::infrastructure::services::InstanceServiceTrait;

#[derive(Clone, Debug)]
pub struct AppState {
    pub instance_service: Arc<dyn InstanceServiceTrait>,
    pub catalog: Arc<PipelineCatalog>,
    pub checklists: Arc<ChecklistRegistry>,
}

impl AppState {
    pub fn new(
        instance_service: Arc<dyn InstanceServiceTrait>,
        catalog: Arc<PipelineCatalog>,
        checklists: Arc<ChecklistRegistry>,
    ) -> Self {
        Self {
            instance_service,
            catalog,
            checklists,
        }
    }
}
