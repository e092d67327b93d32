//! Checklist infrastructure - remote source and cached registry

mod http_source;
mod registry;

pub use http_source::{HttpChecklistConfig, HttpChecklistSource};
pub use registry::ChecklistRegistry;
