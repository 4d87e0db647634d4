//! Fallback Gate
//!
//! The rule path always runs first. Below the threshold the AI completion
//! client is asked for the same canonical JSON; a usable reply is adopted
//! at a fixed confidence. Any failure keeps the rule result.

use serde::Serialize;
use std::sync::Arc;

use voice_command_config::ParserConfig;
use voice_command_core::{CanonicalCommand, CompletionClient, ParseSource};
use voice_command_llm::prompt::{parse_system_prompt, strip_code_fence};

use crate::assembler::{CommandAssembler, ParsedCommand};
use crate::error::{AgentError, AgentResult};

/// A command together with the path that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCommand {
    /// Utterance exactly as received
    pub raw_text: String,
    pub command: CanonicalCommand,
    pub source: ParseSource,
    pub confidence: f32,
}

impl ResolvedCommand {
    fn from_rules(raw_text: &str, parsed: ParsedCommand) -> Self {
        Self {
            raw_text: raw_text.to_string(),
            command: parsed.command,
            source: ParseSource::RuleEngine,
            confidence: parsed.confidence,
        }
    }
}

pub struct FallbackGate {
    assembler: CommandAssembler,
    client: Option<Arc<dyn CompletionClient>>,
    threshold: f32,
    ai_confidence: f32,
}

impl FallbackGate {
    /// `client` is ignored when the fallback is disabled in `config`
    pub fn new(
        assembler: CommandAssembler,
        client: Option<Arc<dyn CompletionClient>>,
        config: &ParserConfig,
    ) -> Self {
        Self {
            assembler,
            client: client.filter(|_| config.ai_fallback_enabled),
            threshold: config.ai_fallback_threshold,
            ai_confidence: config.ai_confidence,
        }
    }

    /// Rule path only
    pub fn rules_only(assembler: CommandAssembler, config: &ParserConfig) -> Self {
        Self::new(assembler, None, config)
    }

    pub fn assembler(&self) -> &CommandAssembler {
        &self.assembler
    }

    pub fn has_ai(&self) -> bool {
        self.client.is_some()
    }

    /// Full resolution of one command, AI fallback included. Never fails.
    pub async fn resolve(&self, text: &str) -> ResolvedCommand {
        let parsed = self.assembler.parse_command(text);

        let client = match &self.client {
            Some(client) if parsed.confidence < self.threshold => client,
            _ => {
                metrics::counter!("voice_command_parses_total", "source" => ParseSource::RuleEngine.as_str())
                    .increment(1);
                return ResolvedCommand::from_rules(text, parsed);
            }
        };

        tracing::info!(
            confidence = parsed.confidence,
            threshold = self.threshold,
            model = client.model_name(),
            "Rule confidence below threshold, asking AI"
        );

        match self.ask_ai(client.as_ref(), text).await {
            Ok(command) => {
                metrics::counter!("voice_command_ai_fallback_total", "outcome" => "adopted")
                    .increment(1);
                metrics::counter!("voice_command_parses_total", "source" => ParseSource::AiFallback.as_str())
                    .increment(1);
                tracing::info!(intent = %command.intent, "AI parse adopted");
                ResolvedCommand {
                    raw_text: text.to_string(),
                    command,
                    source: ParseSource::AiFallback,
                    confidence: self.ai_confidence,
                }
            }
            Err(e) => {
                metrics::counter!("voice_command_ai_fallback_total", "outcome" => "failed")
                    .increment(1);
                metrics::counter!("voice_command_parses_total", "source" => ParseSource::RuleEngine.as_str())
                    .increment(1);
                tracing::warn!(error = %e, "AI fallback failed, keeping rule result");
                ResolvedCommand::from_rules(text, parsed)
            }
        }
    }

    async fn ask_ai(
        &self,
        client: &dyn CompletionClient,
        text: &str,
    ) -> AgentResult<CanonicalCommand> {
        let reply = client.complete(parse_system_prompt(), text).await?;
        decode_ai_reply(&reply)
    }
}

/// Decode an assistant reply into a command, tolerating a markdown fence
pub fn decode_ai_reply(reply: &str) -> AgentResult<CanonicalCommand> {
    let body = strip_code_fence(reply);
    if body.is_empty() {
        return Err(AgentError::InvalidAiReply("empty reply".to_string()));
    }
    serde_json::from_str(body).map_err(|e| AgentError::InvalidAiReply(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use voice_command_core::{Error, Intent, Result};

    struct ScriptedClient {
        reply: std::result::Result<String, String>,
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, _system_prompt: &str, _user_text: &str) -> Result<String> {
            self.reply.clone().map_err(Error::Llm)
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn gate(reply: std::result::Result<&str, &str>) -> FallbackGate {
        let client = ScriptedClient {
            reply: reply.map(str::to_string).map_err(str::to_string),
        };
        FallbackGate::new(
            CommandAssembler::default(),
            Some(Arc::new(client)),
            &ParserConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_high_confidence_skips_ai() {
        let resolved = gate(Err("must not be called"))
            .resolve("ankur 8mm ka rate 65 kar do")
            .await;
        assert_eq!(resolved.source, ParseSource::RuleEngine);
        assert_eq!(resolved.command.intent, Intent::UpdateRate);
    }

    #[tokio::test]
    async fn test_ai_reply_adopted_at_fixed_confidence() {
        let reply = "```json\n{\"intent\": \"CHECK_STOCK\", \"items\": [{\"category\": \"cement\"}]}\n```";
        let resolved = gate(Ok(reply)).resolve("hmm woh wala dikhao").await;
        assert_eq!(resolved.source, ParseSource::AiFallback);
        assert_eq!(resolved.confidence, 0.75);
        assert_eq!(resolved.command.intent, Intent::CheckStock);
        assert_eq!(resolved.raw_text, "hmm woh wala dikhao");
    }

    #[tokio::test]
    async fn test_ai_failure_keeps_rule_result() {
        let resolved = gate(Err("quota exceeded")).resolve("hmm").await;
        assert_eq!(resolved.source, ParseSource::RuleEngine);
        assert_eq!(resolved.confidence, 0.3);
    }

    #[tokio::test]
    async fn test_malformed_reply_keeps_rule_result() {
        let resolved = gate(Ok("Sure! Here is the JSON you asked for")).resolve("hmm").await;
        assert_eq!(resolved.source, ParseSource::RuleEngine);
    }

    #[tokio::test]
    async fn test_disabled_fallback_ignores_client() {
        let config = ParserConfig {
            ai_fallback_enabled: false,
            ..Default::default()
        };
        let client = ScriptedClient {
            reply: Ok(r#"{"intent": "CHECK_STOCK"}"#.to_string()),
        };
        let gate = FallbackGate::new(CommandAssembler::default(), Some(Arc::new(client)), &config);
        assert!(!gate.has_ai());
        assert_eq!(gate.resolve("hmm").await.source, ParseSource::RuleEngine);
    }

    #[test]
    fn test_decode_unknown_intent_is_error() {
        assert!(decode_ai_reply(r#"{"intent": "SING"}"#).is_err());
        assert!(decode_ai_reply("   ").is_err());
    }
}
