//! Voice capture collaborator

use async_trait::async_trait;

use crate::Result;

/// A single voice capture.
///
/// The presentation layer owns the microphone; the core only awaits the
/// transcript. Dropping the future cancels the capture.
#[async_trait]
pub trait SpeechSource: Send + Sync {
    /// Listen until the speaker stops and return the transcript
    async fn capture(&self) -> Result<String>;
}
