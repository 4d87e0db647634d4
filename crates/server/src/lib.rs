//! Voice Command Server
//!
//! Thin HTTP surface over the command pipeline.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, metrics_handler};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use voice_command_agent::AgentError;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Draft lifecycle refused the action
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AgentError> for ServerError {
    fn from(err: AgentError) -> Self {
        use voice_command_core::Error as CoreError;

        let message = err.to_string();
        match err {
            AgentError::DraftNotFound(_) | AgentError::Core(CoreError::DraftNotFound(_)) => {
                ServerError::NotFound(message)
            }
            AgentError::NotConfirmed(_)
            | AgentError::Core(CoreError::InvalidTransition { .. })
            | AgentError::Core(CoreError::ClarificationsPending(_))
            | AgentError::Core(CoreError::ClarificationNotFound { .. })
            | AgentError::Core(CoreError::BelowRejectFloor { .. }) => ServerError::Conflict(message),
            AgentError::Core(CoreError::InvalidResolution { .. }) => {
                ServerError::InvalidRequest(message)
            }
            _ => ServerError::Internal(message),
        }
    }
}

impl From<ServerError> for voice_command_core::Error {
    fn from(err: ServerError) -> Self {
        voice_command_core::Error::Store(err.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let status = StatusCode::from(self);
        if status.is_server_error() {
            tracing::error!(error = %message, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
