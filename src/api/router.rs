use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{instances, pipelines};
use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/pipelines", get(pipelines::list_pipelines))
        .route("/pipelines/{kind}", get(pipelines::get_pipeline))
        .route("/pipelines/{kind}/checklist", get(pipelines::get_checklist))
        .route("/pipelines/{kind}/board", get(pipelines::get_board))
        .route(
            "/pipelines/{kind}/instances",
            get(instances::list_instances).post(instances::create_instance),
        )
        .route(
            "/instances/{id}",
            get(instances::get_instance).delete(instances::delete_instance),
        )
        .route(
            "/instances/{id}/transition",
            post(instances::transition_instance),
        )
        .route(
            "/instances/{id}/pending-items",
            put(instances::set_pending_items),
        )
        .route("/instances/{id}/assignee", put(instances::assign_instance))
}

/// Full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/api", api_router())
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Adds the Prometheus scrape endpoint when metrics are enabled
pub fn with_metrics(router: Router, metrics: Option<PrometheusMetrics>, path: &str) -> Router {
    match metrics {
        Some(metrics) => router.merge(create_metrics_router(metrics, path)),
        None => router,
    }
}
