//! Audio acquisition stage.
//!
//! The acquisition tool downloads every identifier in its input file into a
//! nested directory tree. Its stdout is the only progress signal available:
//! each line is run through a [`LineClassifier`] and every recognized track
//! completion advances a [`CompletionCounter`], which is mapped into the
//! download stage's progress band.

mod classifier;
mod command;
mod config;
mod tracker;

pub use classifier::{LineClassifier, LineKind, MarkerClassifier};
pub use command::CommandAcquirer;
pub use config::AcquisitionConfig;
pub use tracker::{AcquisitionTracker, CompletionCounter};

use async_trait::async_trait;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::progress::ProgressReporter;

/// Errors from the acquisition stage.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("failed to start {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("{program} failed with {status}")]
    Failed { program: String, status: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// What the acquisition tool reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionSummary {
    /// Track completions observed in the tool output.
    pub completed: usize,
    /// Expected track count used as denominator.
    pub units: usize,
}

/// Downloads audio for a file of identifiers.
#[async_trait]
pub trait Acquirer: Send + Sync {
    /// Returns the name of this acquirer implementation.
    fn name(&self) -> &str;

    /// Downloads everything listed in `input` into `output_dir`.
    ///
    /// `units` is the expected track count used for progress estimation.
    async fn acquire(
        &self,
        input: &Path,
        output_dir: &Path,
        units: usize,
        reporter: &mut ProgressReporter,
    ) -> Result<AcquisitionSummary, AcquisitionError>;
}
