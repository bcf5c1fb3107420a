//! Pipeline runner.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use super::config::PipelineConfig;
use super::error::PipelineError;
use crate::acquisition::{Acquirer, CommandAcquirer};
use crate::archiver::{self, Archiver};
use crate::config::Config;
use crate::converter::{Converter, FfmpegConverter};
use crate::progress::{ProgressReporter, Stage};
use crate::request::DownloadRequest;
use crate::resolver::{CommandResolver, Resolver};
use crate::transcode::{flatten_and_transcode, TranscodeTarget};
use crate::workarea::WorkingArea;

/// How a run ended. The terminal event has already been sent when this is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Completed {
        filename: String,
        archive_bytes: usize,
    },
    Failed {
        /// Stage that was running when the failure happened.
        stage: Stage,
        error: String,
    },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Archive filename for a given day, e.g. `songs-05-Mar-2025.zip`.
pub fn archive_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.zip", prefix, date.format("%d-%b-%Y"))
}

struct Bundle {
    filename: String,
    data: String,
    archive_bytes: usize,
}

/// Runs requests through resolution, acquisition, transcoding and archiving.
///
/// Holds no per-request state; one instance serves every request.
pub struct DownloadPipeline {
    config: PipelineConfig,
    resolver: Arc<dyn Resolver>,
    acquirer: Arc<dyn Acquirer>,
    converter: Arc<dyn Converter>,
    archiver: Arc<dyn Archiver>,
    bitrate_kbps: Option<u32>,
}

impl DownloadPipeline {
    pub fn new(
        config: PipelineConfig,
        resolver: Arc<dyn Resolver>,
        acquirer: Arc<dyn Acquirer>,
        converter: Arc<dyn Converter>,
        archiver: Arc<dyn Archiver>,
    ) -> Self {
        Self {
            config,
            resolver,
            acquirer,
            converter,
            archiver,
            bitrate_kbps: None,
        }
    }

    /// Builds the pipeline with the command-backed stages from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.pipeline.clone(),
            Arc::new(CommandResolver::new(config.resolver.clone())),
            Arc::new(CommandAcquirer::new(config.acquisition.clone())),
            Arc::new(FfmpegConverter::new(config.transcoder.clone())),
            archiver::from_config(&config.archiver),
        )
        .with_bitrate(config.transcoder.bitrate_kbps)
    }

    /// Overrides the target format's default bitrate.
    pub fn with_bitrate(mut self, bitrate_kbps: Option<u32>) -> Self {
        self.bitrate_kbps = bitrate_kbps;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one request to completion.
    ///
    /// Consumes the reporter: exactly one terminal event is sent, after the
    /// working area has been released.
    pub async fn run(
        &self,
        request: DownloadRequest,
        mut reporter: ProgressReporter,
    ) -> PipelineOutcome {
        let started = Instant::now();
        reporter.enter(Stage::Init, "Preparing download", 0).await;

        let result = match WorkingArea::acquire(&self.config.work_dir).await {
            Ok(area) => {
                let result = self.execute(&request, &area, &mut reporter).await;
                area.release().await;
                result
            }
            Err(e) => Err(PipelineError::from(e)),
        };

        match result {
            Ok(bundle) => {
                info!(
                    "Bundle {} ready ({} bytes) in {:?}",
                    bundle.filename,
                    bundle.archive_bytes,
                    started.elapsed()
                );
                reporter
                    .complete(
                        format!("Bundle ready: {}", bundle.filename),
                        bundle.filename.clone(),
                        bundle.data,
                    )
                    .await;
                PipelineOutcome::Completed {
                    filename: bundle.filename,
                    archive_bytes: bundle.archive_bytes,
                }
            }
            Err(e) => {
                let stage = reporter.stage();
                let message = e.to_string();
                error!("Pipeline failed during {}: {}", stage, message);
                reporter.fail(message.clone()).await;
                PipelineOutcome::Failed {
                    stage,
                    error: message,
                }
            }
        }
    }

    async fn execute(
        &self,
        request: &DownloadRequest,
        area: &WorkingArea,
        reporter: &mut ProgressReporter,
    ) -> Result<Bundle, PipelineError> {
        let songs = &request.songs;
        let raw_input = area.write_input(songs).await?;
        reporter
            .enter(Stage::Init, format!("Received {} songs", songs.len()), 5)
            .await;

        let mut units = songs.len();
        let mut input = raw_input;
        if songs.is_resolved(&self.config.identifier_prefixes) {
            info!("Input already holds identifiers, skipping resolution");
        } else {
            reporter
                .enter(Stage::Convert, "Converting songs to track links", 5)
                .await;
            let resolved = self
                .resolver
                .resolve(&input, units, area, reporter)
                .await?;
            reporter.advance(10, Some(resolved.summary(units))).await;
            units = resolved.identifiers;
            input = resolved.path;
        }

        reporter
            .enter(Stage::Download, format!("Downloading {} tracks", units), 15)
            .await;
        let acquired = self
            .acquirer
            .acquire(&input, &area.downloads_dir(), units, reporter)
            .await?;
        info!(
            "Acquisition finished with {} of {} tracks reported",
            acquired.completed, acquired.units
        );

        let format = request.format.unwrap_or(self.config.output_format);
        let target = TranscodeTarget::new(format, self.bitrate_kbps);
        let transcoded = flatten_and_transcode(
            self.converter.as_ref(),
            &area.downloads_dir(),
            &area.output_dir(),
            target,
            reporter,
        )
        .await?;
        if transcoded.total == 0 {
            return Err(PipelineError::NoAudioFiles);
        }

        reporter
            .enter(
                Stage::Zip,
                format!("Creating archive of {} files", transcoded.total),
                90,
            )
            .await;
        let archive_path = area.archive_path();
        self.archiver
            .archive(&area.output_dir(), &archive_path, reporter)
            .await?;

        let bytes = tokio::fs::read(&archive_path)
            .await
            .map_err(|source| PipelineError::Payload {
                path: archive_path.clone(),
                source,
            })?;

        Ok(Bundle {
            filename: archive_filename(&self.config.archive_prefix, Local::now().date_naive()),
            archive_bytes: bytes.len(),
            data: STANDARD.encode(&bytes),
        })
    }
}
