use std::sync::Arc;
use songbundle_core::{AvailabilityReport, Config, DownloadPipeline, SanitizedConfig, ToolAvailability};

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: Arc<DownloadPipeline>,
    availability: Arc<ToolAvailability>,
}

impl AppState {
    pub fn new(
        config: Config,
        pipeline: Arc<DownloadPipeline>,
        availability: Arc<ToolAvailability>,
    ) -> Self {
        Self {
            config,
            pipeline,
            availability,
        }
    }

    /// Wires the command-backed pipeline and tool checks from `config`.
    pub fn from_config(config: Config) -> Self {
        let pipeline = Arc::new(DownloadPipeline::from_config(&config));
        let availability = Arc::new(ToolAvailability::from_config(&config));
        Self::new(config, pipeline, availability)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn pipeline(&self) -> Arc<DownloadPipeline> {
        Arc::clone(&self.pipeline)
    }

    pub async fn tool_report(&self) -> AvailabilityReport {
        self.availability.report().await
    }

    pub async fn tools_available(&self) -> bool {
        self.availability.is_available().await
    }
}
