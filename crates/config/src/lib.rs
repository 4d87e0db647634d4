//! Configuration management for the voice command interpreter
//!
//! Supports loading configuration from:
//! - TOML/YAML files under `config/` (`default`, then the runtime environment)
//! - Environment variables (VOICE_COMMAND_ prefix, `__` separator)
//!
//! Every section has built-in defaults, so an empty configuration is valid.

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, ConversionConfig, LlmConfig, ObservabilityConfig,
    ParserConfig, PersistenceConfig, PipelineConfig, RuntimeEnvironment, ServerConfig, Settings, VoiceConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for voice_command_core::Error {
    fn from(err: ConfigError) -> Self {
        voice_command_core::Error::Config(err.to_string())
    }
}
