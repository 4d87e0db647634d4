//! Agent error types
//!
//! Clarifications, selections and unresolved customers are outcomes, not
//! errors; only infrastructure and lifecycle misuse end up here.

use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use voice_command_core::DraftStatus;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("No speech captured within {0:?}")]
    ListenTimeout(Duration),

    #[error("Speech capture failed: {0}")]
    Capture(String),

    #[error("Draft not found: {0}")]
    DraftNotFound(Uuid),

    #[error("Draft is {0}, only confirmed drafts can be executed")]
    NotConfirmed(DraftStatus),

    #[error("AI reply rejected: {0}")]
    InvalidAiReply(String),

    #[error(transparent)]
    Core(#[from] voice_command_core::Error),
}

impl From<AgentError> for voice_command_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Core(inner) => inner,
            AgentError::DraftNotFound(id) => voice_command_core::Error::DraftNotFound(id),
            AgentError::InvalidAiReply(msg) => voice_command_core::Error::Llm(msg),
            other => voice_command_core::Error::Store(other.to_string()),
        }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
