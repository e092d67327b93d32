//! Checklist domain - required actions per (pipeline kind, stage)

mod source;
mod table;

pub use source::ChecklistSource;
pub use table::{builtin_checklist, ChecklistTable};

#[cfg(test)]
pub use source::MockChecklistSource;
