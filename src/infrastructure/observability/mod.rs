//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_checklist_fallback, record_guard_violation,
    record_http_request, record_transition, PrometheusMetrics,
};
