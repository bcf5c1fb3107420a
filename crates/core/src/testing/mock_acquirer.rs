//! Mock acquirer for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::fixtures::acquisition_track_lines;
use crate::acquisition::{
    Acquirer, AcquisitionError, AcquisitionSummary, AcquisitionTracker, MarkerClassifier,
};
use crate::process::{OutputLine, OutputSource};
use crate::progress::ProgressReporter;

/// A recorded acquisition for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedAcquisition {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub units: usize,
}

/// Mock implementation of the Acquirer trait.
///
/// Creates audio files in an artist/album tree and replays tool-shaped
/// output through the real classifier, so progress accounting behaves as
/// it does against the real tool.
#[derive(Debug, Clone)]
pub struct MockAcquirer {
    /// Relative paths of files to create; one per unit when unset.
    tracks: Arc<RwLock<Option<Vec<String>>>>,
    /// Exit status reported after the tracks were written.
    exit_failure: Arc<RwLock<Option<String>>>,
    /// If set, the next operation will fail with this error before any output.
    next_error: Arc<RwLock<Option<AcquisitionError>>>,
    acquisitions: Arc<RwLock<Vec<RecordedAcquisition>>>,
}

impl Default for MockAcquirer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAcquirer {
    pub fn new() -> Self {
        Self {
            tracks: Arc::new(RwLock::new(None)),
            exit_failure: Arc::new(RwLock::new(None)),
            next_error: Arc::new(RwLock::new(None)),
            acquisitions: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the files produced, relative to the output directory.
    pub async fn set_tracks(&self, tracks: Vec<String>) {
        *self.tracks.write().await = Some(tracks);
    }

    /// Make the tool "exit" unsuccessfully with this status.
    pub async fn set_exit_failure(&self, status: impl Into<String>) {
        *self.exit_failure.write().await = Some(status.into());
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: AcquisitionError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded_acquisitions(&self) -> Vec<RecordedAcquisition> {
        self.acquisitions.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.acquisitions.read().await.len()
    }
}

#[async_trait]
impl Acquirer for MockAcquirer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn acquire(
        &self,
        input: &Path,
        output_dir: &Path,
        units: usize,
        reporter: &mut ProgressReporter,
    ) -> Result<AcquisitionSummary, AcquisitionError> {
        self.acquisitions.write().await.push(RecordedAcquisition {
            input: input.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            units,
        });
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let tracks = match self.tracks.read().await.clone() {
            Some(tracks) => tracks,
            None => (1..=units)
                .map(|i| format!("Mock Artist/Mock Album/{:02} Track {}.m4a", i, i))
                .collect(),
        };

        let mut tracker = AcquisitionTracker::new(Arc::new(MarkerClassifier::default()), units);
        for (index, track) in tracks.iter().enumerate() {
            let path = output_dir.join(track);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, format!("audio:{}", track)).await?;

            let title = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            for text in acquisition_track_lines(index + 1, &title) {
                let line = OutputLine {
                    source: OutputSource::Stdout,
                    text,
                };
                tracker.observe(&line, reporter).await;
            }
        }

        if let Some(status) = self.exit_failure.read().await.clone() {
            return Err(AcquisitionError::Failed {
                program: "mock".to_string(),
                status,
            });
        }

        let counter = tracker.counter();
        Ok(AcquisitionSummary {
            completed: counter.completed(),
            units: counter.units(),
        })
    }
}
