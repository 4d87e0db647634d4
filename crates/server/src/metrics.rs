//! Prometheus metrics

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

/// Install the global Prometheus recorder. Returns `None` if a recorder is
/// already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            describe();
            Some(handle)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Metrics recorder not installed");
            None
        }
    }
}

fn describe() {
    metrics::describe_counter!(
        "voice_command_parses_total",
        "Commands resolved, by parse source"
    );
    metrics::describe_counter!(
        "voice_command_ai_fallback_total",
        "AI fallback attempts, by outcome"
    );
    metrics::describe_counter!(
        "voice_command_clarifications_total",
        "Clarifications raised, by reason code"
    );
    metrics::describe_counter!(
        "voice_command_executions_total",
        "Draft executions, by outcome"
    );
}

/// `GET /metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled\n".to_string()),
    }
}
