//! AI completion collaborator

use async_trait::async_trait;

use crate::Result;

/// Remote large-language-model completion.
///
/// Implementations send one request per call; the caller decides what to
/// do with a failure.
///
/// # Example
///
/// ```ignore
/// let client: Arc<dyn CompletionClient> = Arc::new(CompletionAdapter::new(backend));
/// let reply = client.complete(PARSE_SYSTEM_PROMPT, "ankur 8mm rate 65").await?;
/// ```
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Return the raw assistant text (may be wrapped in a markdown fence)
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String>;

    /// Model name for logging
    fn model_name(&self) -> &str;
}
