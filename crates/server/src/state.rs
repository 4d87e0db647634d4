//! Application State

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use voice_command_agent::CommandPipeline;
use voice_command_config::Settings;
use voice_command_core::{CompletionClient, Language};
use voice_command_persistence::PersistenceLayer;

/// Shared state across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub pipeline: Arc<CommandPipeline>,
    pub persistence: PersistenceLayer,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Rule-only state over empty in-memory stores
    pub fn new(config: Settings) -> Self {
        Self::with_parts(config, PersistenceLayer::new(), None)
    }

    pub fn with_parts(
        config: Settings,
        persistence: PersistenceLayer,
        client: Option<Arc<dyn CompletionClient>>,
    ) -> Self {
        let pipeline = CommandPipeline::from_settings(
            &config,
            client,
            persistence.rates.clone(),
            persistence.customers.clone(),
            persistence.drafts.clone(),
        );
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            persistence,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    /// Language used when a request does not name one
    pub fn default_language(&self) -> Language {
        self.config.voice.default_language
    }
}
