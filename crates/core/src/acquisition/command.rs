//! Acquirer backed by an external download tool.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::classifier::{LineClassifier, MarkerClassifier};
use super::config::AcquisitionConfig;
use super::tracker::AcquisitionTracker;
use super::{Acquirer, AcquisitionError, AcquisitionSummary};
use crate::process::{describe_exit, StreamingChild};
use crate::progress::ProgressReporter;

/// Runs the configured acquisition tool and scrapes its output for progress.
pub struct CommandAcquirer {
    config: AcquisitionConfig,
    classifier: Arc<dyn LineClassifier>,
}

impl CommandAcquirer {
    pub fn new(config: AcquisitionConfig) -> Self {
        let classifier = Arc::new(MarkerClassifier::from_config(&config));
        Self { config, classifier }
    }

    pub fn with_defaults() -> Self {
        Self::new(AcquisitionConfig::default())
    }

    /// Replaces the marker classifier derived from the configuration.
    pub fn with_classifier(mut self, classifier: Arc<dyn LineClassifier>) -> Self {
        self.classifier = classifier;
        self
    }
}

#[async_trait]
impl Acquirer for CommandAcquirer {
    fn name(&self) -> &str {
        "command"
    }

    async fn acquire(
        &self,
        input: &Path,
        output_dir: &Path,
        units: usize,
        reporter: &mut ProgressReporter,
    ) -> Result<AcquisitionSummary, AcquisitionError> {
        let program = self.config.command.display_name();
        let mut command = self.config.command.command();
        command
            .arg(&self.config.input_flag)
            .arg(input)
            .arg(&self.config.output_flag)
            .arg(output_dir)
            .args(&self.config.quiet_flags);

        info!("Acquiring {} tracks with {}", units, program);
        let mut child = StreamingChild::spawn(command).map_err(|source| AcquisitionError::Spawn {
            program: program.clone(),
            source,
        })?;

        let mut tracker = AcquisitionTracker::new(Arc::clone(&self.classifier), units);
        while let Some(line) = child.next_line().await {
            debug!("{}: {}", program, line.text);
            tracker.observe(&line, reporter).await;
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(AcquisitionError::Failed {
                program,
                status: describe_exit(&status),
            });
        }

        let counter = tracker.counter();
        info!(
            "{} reported {} of {} tracks",
            program,
            counter.completed(),
            counter.units()
        );
        Ok(AcquisitionSummary {
            completed: counter.completed(),
            units: counter.units(),
        })
    }
}
