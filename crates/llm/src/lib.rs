//! AI completion for the parse fallback
//!
//! Features:
//! - OpenAI-compatible chat backend (OpenAI, Azure, local servers)
//! - Adapter exposing any backend as the core `CompletionClient`
//! - The fixed parse instruction and markdown-fence stripping

pub mod adapter;
pub mod backend;
pub mod prompt;

pub use adapter::CompletionAdapter;
pub use backend::{GenerationResult, LlmBackend, OpenAIBackend, OpenAIConfig};
pub use prompt::{parse_system_prompt, strip_code_fence, Message, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for voice_command_core::Error {
    fn from(err: LlmError) -> Self {
        voice_command_core::Error::Llm(err.to_string())
    }
}
