//! Error types shared across the workspace

use thiserror::Error;
use uuid::Uuid;

use crate::clarification::ReasonCode;
use crate::draft::DraftStatus;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Draft not found: {0}")]
    DraftNotFound(Uuid),

    #[error("Cannot {action} a draft in status {from}")]
    InvalidTransition { from: DraftStatus, action: &'static str },

    #[error("Confidence {confidence:.2} is at or below the reject floor {floor:.2}")]
    BelowRejectFloor { confidence: f32, floor: f32 },

    #[error("No open {reason} clarification for item {item_index:?}")]
    ClarificationNotFound {
        reason: ReasonCode,
        item_index: Option<usize>,
    },

    #[error("Invalid answer '{value}' for {reason}")]
    InvalidResolution { reason: ReasonCode, value: String },

    #[error("Draft still has {0} open clarification(s)")]
    ClarificationsPending(usize),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
