//! Completion adapter
//!
//! Bridges the LlmBackend trait to the core CompletionClient trait, so any
//! backend can serve as the parse fallback.

use async_trait::async_trait;
use std::sync::Arc;

use voice_command_core::{CompletionClient, Error, Result};

use crate::backend::LlmBackend;
use crate::prompt::Message;

/// Adapter that wraps an LlmBackend to implement the core CompletionClient trait.
///
/// # Example
///
/// ```ignore
/// let backend = OpenAIBackend::new(OpenAIConfig::from_settings(&settings.llm))?;
/// let client: Arc<dyn CompletionClient> = Arc::new(CompletionAdapter::new(backend));
/// ```
pub struct CompletionAdapter {
    backend: Arc<dyn LlmBackend>,
    model_name: String,
}

impl CompletionAdapter {
    /// Create a new adapter wrapping an LlmBackend
    pub fn new<B: LlmBackend + 'static>(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Create from an Arc'd backend
    pub fn from_arc(backend: Arc<dyn LlmBackend>) -> Self {
        let model_name = backend.model_name().to_string();
        Self {
            backend,
            model_name,
        }
    }
}

#[async_trait]
impl CompletionClient for CompletionAdapter {
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String> {
        let messages = [Message::system(system_prompt), Message::user(user_text)];

        match self.backend.generate(&messages).await {
            Ok(result) => {
                tracing::debug!(
                    model = %self.model_name,
                    tokens = result.tokens,
                    total_time_ms = result.total_time_ms,
                    "Completion generated"
                );
                Ok(result.text)
            }
            Err(e) => Err(Error::Llm(format!("Completion failed: {}", e))),
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
