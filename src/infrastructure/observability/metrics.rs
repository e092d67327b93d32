//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::MetricsConfig;
use crate::domain::{PipelineKind, StageDirection};

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap()
});

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Handle for rendering the Prometheus exposition
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the global recorder; `None` when disabled or already installed
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("fidc_pipelines_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Accepted stage change
pub fn record_transition(kind: PipelineKind, direction: StageDirection) {
    counter!(
        "pipeline_transitions_total",
        "pipeline" => kind.as_str(),
        "direction" => direction.as_str()
    )
    .increment(1);
}

/// Forward move rejected because checklist items were pending
pub fn record_guard_violation(kind: PipelineKind) {
    counter!("pipeline_guard_violations_total", "pipeline" => kind.as_str()).increment(1);
}

/// Remote checklist unavailable or invalid; static table served instead
pub fn record_checklist_fallback(kind: PipelineKind) {
    counter!("checklist_fallback_total", "pipeline" => kind.as_str()).increment(1);
}

/// Collapses IDs in a path to keep label cardinality bounded
fn sanitize_path(path: &str) -> String {
    let path = UUID_SEGMENT.replace_all(path, "{id}");
    let path = NUMERIC_SEGMENT.replace_all(&path, "/{id}$1");

    path.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_uuid() {
        let path = "/api/instances/550e8400-e29b-41d4-a716-446655440000/transition";
        assert_eq!(sanitize_path(path), "/api/instances/{id}/transition");
    }

    #[test]
    fn test_sanitize_path_numeric_id() {
        assert_eq!(sanitize_path("/api/instances/42"), "/api/instances/{id}");
    }

    #[test]
    fn test_sanitize_path_no_id() {
        assert_eq!(sanitize_path("/api/pipelines/receivables/board"), "/api/pipelines/receivables/board");
    }

    #[test]
    fn test_sanitize_path_truncates() {
        let path = "/api/pipelines/receivables/instances/with/a/very/long/suffix/here";
        assert_eq!(sanitize_path(path).chars().count(), 50);
    }

    #[test]
    fn test_recorders_without_installed_exporter() {
        // No global recorder in unit tests; calls must be no-ops
        record_transition(PipelineKind::Allocation, StageDirection::Backward);
        record_guard_violation(PipelineKind::Receivables);
        record_checklist_fallback(PipelineKind::Monitoring);
        record_http_request("GET", "/health", 200, Duration::from_millis(3));
    }
}
