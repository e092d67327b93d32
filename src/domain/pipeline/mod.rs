//! Pipeline definition domain
//!
//! Each pipeline kind owns a total order of stages. Position in that order is
//! what makes a transition "forward" or "backward"; terminal stages are the
//! only ones from which an instance may be deleted.

mod catalog;
mod definition;
mod error;
mod kind;

pub use catalog::PipelineCatalog;
pub use definition::{PipelineDefinition, StageDefinition, StageDirection};
pub use error::PipelineError;
pub use kind::PipelineKind;
