//! Voice capture guard

use std::time::Duration;
use tokio::time::timeout;

use voice_command_core::SpeechSource;

use crate::error::{AgentError, AgentResult};

/// Await exactly one capture. When `limit` elapses the capture future is
/// dropped and the caller is told to retry; there is no second attempt.
pub async fn listen_once(source: &dyn SpeechSource, limit: Duration) -> AgentResult<String> {
    match timeout(limit, source.capture()).await {
        Ok(Ok(transcript)) => {
            tracing::debug!(chars = transcript.chars().count(), "Speech captured");
            Ok(transcript)
        }
        Ok(Err(e)) => Err(AgentError::Capture(e.to_string())),
        Err(_) => {
            tracing::info!(?limit, "Listen timeout, capture cancelled");
            Err(AgentError::ListenTimeout(limit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use voice_command_core::{Error, Result};

    struct SlowSpeaker {
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SpeechSource for SlowSpeaker {
        async fn capture(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok("ankur 8mm ka rate 65 kar do".to_string())
        }
    }

    struct DeniedMic;

    #[async_trait]
    impl SpeechSource for DeniedMic {
        async fn capture(&self) -> Result<String> {
            Err(Error::Config("microphone permission denied".into()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_within_limit() {
        let speaker = SlowSpeaker {
            delay: Duration::from_secs(2),
            calls: AtomicUsize::new(0),
        };
        let text = listen_once(&speaker, Duration::from_secs(10)).await.unwrap();
        assert!(text.contains("ankur"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_single_attempt() {
        let speaker = SlowSpeaker {
            delay: Duration::from_secs(30),
            calls: AtomicUsize::new(0),
        };
        let result = listen_once(&speaker, Duration::from_secs(10)).await;
        assert!(matches!(result, Err(AgentError::ListenTimeout(d)) if d == Duration::from_secs(10)));
        assert_eq!(speaker.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_capture_error() {
        let result = listen_once(&DeniedMic, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(AgentError::Capture(_))));
    }
}
