//! API layer - HTTP endpoints and middleware

pub mod handlers;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

pub use router::{create_router_with_state, with_metrics};
pub use state::AppState;
