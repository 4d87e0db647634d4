//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use voice_command_core::Language;

use crate::constants::{endpoints, thresholds, timeouts, tmt};
use crate::ConfigError;

/// Environment variable naming the runtime environment file to layer
pub const ENV_SELECTOR: &str = "VOICE_COMMAND_ENV";

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Relaxed validation
    #[default]
    Development,
    Staging,
    /// All validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Rule parser and fallback gate thresholds
    #[serde(default)]
    pub parser: ParserConfig,

    /// AI completion client
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub conversion: ConversionConfig,

    #[serde(default)]
    pub voice: VoiceConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Validate all sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_parser()?;
        self.validate_llm()?;
        self.validate_conversion()?;
        self.validate_voice()?;
        Ok(())
    }

    fn validate_parser(&self) -> Result<(), ConfigError> {
        let parser = &self.parser;

        for (field, value) in [
            ("parser.ai_fallback_threshold", parser.ai_fallback_threshold),
            ("parser.ai_confidence", parser.ai_confidence),
            ("parser.reject_floor", parser.reject_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be between 0.0 and 1.0, got {}", value),
                });
            }
        }

        if parser.reject_floor > parser.ai_fallback_threshold {
            return Err(ConfigError::InvalidValue {
                field: "parser.reject_floor".to_string(),
                message: format!(
                    "Reject floor {} is above the AI fallback threshold {}",
                    parser.reject_floor, parser.ai_fallback_threshold
                ),
            });
        }

        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if llm.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_secs".to_string(),
                message: "Timeout must be greater than zero".to_string(),
            });
        }

        if llm.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.endpoint".to_string()));
        }

        // Production requires a key whenever the fallback can fire
        if self.environment.is_production()
            && self.parser.ai_fallback_enabled
            && llm.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "llm.api_key".to_string(),
                message: "API key required in production when the AI fallback is enabled"
                    .to_string(),
            });
        }

        Ok(())
    }

    fn validate_conversion(&self) -> Result<(), ConfigError> {
        if self.conversion.tmt_standard_length_m <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "conversion.tmt_standard_length_m".to_string(),
                message: format!(
                    "Must be positive, got {}",
                    self.conversion.tmt_standard_length_m
                ),
            });
        }
        Ok(())
    }

    fn validate_voice(&self) -> Result<(), ConfigError> {
        if self.voice.listen_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "voice.listen_timeout_secs".to_string(),
                message: "Timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed origins; any origin when empty
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    timeouts::HTTP_REQUEST_SECS
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_request_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Parser thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Rule confidence strictly below this consults the AI
    #[serde(default = "default_ai_fallback_threshold")]
    pub ai_fallback_threshold: f32,

    /// Confidence stamped on a successful AI parse
    #[serde(default = "default_ai_confidence")]
    pub ai_confidence: f32,

    /// Confidence at or below this never becomes a draft
    #[serde(default = "default_reject_floor")]
    pub reject_floor: f32,

    #[serde(default = "default_true")]
    pub ai_fallback_enabled: bool,
}

fn default_ai_fallback_threshold() -> f32 {
    thresholds::AI_FALLBACK
}
fn default_ai_confidence() -> f32 {
    thresholds::AI_CONFIDENCE
}
fn default_reject_floor() -> f32 {
    thresholds::REJECT_FLOOR
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            ai_fallback_threshold: default_ai_fallback_threshold(),
            ai_confidence: default_ai_confidence(),
            reject_floor: default_reject_floor(),
            ai_fallback_enabled: true,
        }
    }
}

/// AI completion client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Falls back to `OPENAI_API_KEY`
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Zero keeps the JSON output deterministic
    #[serde(default)]
    pub temperature: f32,

    /// Request `response_format: json_object`; off for servers that reject it
    #[serde(default = "default_json_mode")]
    pub json_mode: bool,

    /// Azure OpenAI API version. When set, `endpoint` is the Azure resource
    /// URL and `model` the deployment name.
    #[serde(default)]
    pub api_version: Option<String>,
}

fn default_llm_endpoint() -> String {
    endpoints::OPENAI_DEFAULT.to_string()
}
fn default_llm_model() -> String {
    endpoints::DEFAULT_MODEL.to_string()
}
fn default_api_key() -> Option<String> {
    std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())
}
fn default_llm_timeout() -> u64 {
    timeouts::LLM_REQUEST_SECS
}
fn default_max_tokens() -> u32 {
    512
}
fn default_json_mode() -> bool {
    true
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: default_api_key(),
            timeout_secs: default_llm_timeout(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            json_mode: default_json_mode(),
            api_version: None,
        }
    }
}

/// Unit conversion constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    #[serde(default = "default_tmt_length")]
    pub tmt_standard_length_m: f64,
}

fn default_tmt_length() -> f64 {
    tmt::STANDARD_LENGTH_M
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            tmt_standard_length_m: default_tmt_length(),
        }
    }
}

/// Voice capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "default_listen_timeout")]
    pub listen_timeout_secs: u64,

    /// Language used for prompts when the request does not name one
    #[serde(default)]
    pub default_language: Language,
}

fn default_listen_timeout() -> u64 {
    timeouts::LISTEN_SECS
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            listen_timeout_secs: default_listen_timeout(),
            default_language: Language::default(),
        }
    }
}

/// Multi-clause pipeline behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Confirm and execute clauses whose draft needs no clarification
    #[serde(default = "default_true")]
    pub execute_clean_drafts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            execute_clean_drafts: true,
        }
    }
}

/// In-memory store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PersistenceConfig {
    /// YAML file with customers and rate rows loaded at startup
    #[serde(default)]
    pub seed_file: Option<String>,
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Serve Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/` and the environment.
///
/// The runtime environment file is `env` when given, otherwise the value of
/// `VOICE_COMMAND_ENV`.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let selected = env
        .map(str::to_string)
        .or_else(|| std::env::var(ENV_SELECTOR).ok());
    load_settings_from(Path::new("config"), selected.as_deref())
}

/// Load settings with `dir` as the configuration directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    let default_path = dir.join("default");
    builder = builder.add_source(File::with_name(&default_path.to_string_lossy()).required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        let env_path = dir.join(env_name);
        builder = builder.add_source(File::with_name(&env_path.to_string_lossy()).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("VOICE_COMMAND")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        environment = ?settings.environment,
        ai_fallback_enabled = settings.parser.ai_fallback_enabled,
        "Settings loaded"
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.parser.ai_fallback_threshold, 0.5);
        assert_eq!(settings.parser.ai_confidence, 0.75);
        assert_eq!(settings.parser.reject_floor, 0.3);
        assert_eq!(settings.conversion.tmt_standard_length_m, 12.0);
        assert_eq!(settings.voice.default_language, Language::Hindi);
        assert!(settings.pipeline.execute_clean_drafts);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_threshold_bounds() {
        let mut settings = Settings::default();
        settings.parser.ai_confidence = 1.5;
        assert!(settings.validate().is_err());

        settings.parser.ai_confidence = 0.75;
        settings.parser.reject_floor = 0.6;
        assert!(settings.validate().is_err());

        settings.parser.reject_floor = 0.5;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut settings = Settings::default();
        settings.llm.timeout_secs = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.voice.listen_timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_standard_length_positive() {
        let mut settings = Settings::default();
        settings.conversion.tmt_standard_length_m = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_production_api_key_validation() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        settings.llm.api_key = None;

        // Production with the fallback enabled requires a key
        assert!(settings.validate_llm().is_err());

        settings.parser.ai_fallback_enabled = false;
        assert!(settings.validate_llm().is_ok());

        settings.parser.ai_fallback_enabled = true;
        settings.llm.api_key = Some("sk-test".to_string());
        assert!(settings.validate_llm().is_ok());
    }

    #[test]
    fn test_file_layering() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[parser]\nai_fallback_threshold = 0.6\nreject_floor = 0.2\n\n[server]\nport = 9000\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("staging.yaml"),
            "environment: staging\nparser:\n  reject_floor: 0.25\nvoice:\n  default_language: en\n",
        )
        .unwrap();

        let settings = load_settings_from(dir.path(), Some("staging")).unwrap();
        assert_eq!(settings.environment, RuntimeEnvironment::Staging);
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.parser.ai_fallback_threshold, 0.6);
        assert_eq!(settings.parser.reject_floor, 0.25);
        assert_eq!(settings.parser.ai_confidence, 0.75);
        assert_eq!(settings.voice.default_language, Language::English);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[parser]\nreject_floor = 0.9\n",
        )
        .unwrap();
        assert!(load_settings_from(dir.path(), None).is_err());
    }

    #[test]
    fn test_missing_directory_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("absent"), None).unwrap();
        assert_eq!(settings.server.port, 8080);
    }
}
