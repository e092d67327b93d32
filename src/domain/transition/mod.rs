//! Transition domain - forward guard, backward reseed and checklist updates

mod engine;

pub use engine::{stage_deadline, ForwardEntryPolicy, TransitionEngine, TransitionOutcome};
