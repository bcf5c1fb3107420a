//! Store-mode archiving of the flattened output directory.
//!
//! Audio is already compressed, so entries are stored without further
//! compression. Two backends exist: an external `zip` command and an
//! in-process writer for hosts without one.

mod builtin;
mod command;
mod config;

pub use builtin::BuiltinArchiver;
pub use command::CommandArchiver;
pub use config::{ArchiverBackend, ArchiverConfig};

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::progress::ProgressReporter;

/// Errors from the archiving stage.
#[derive(Debug, Error)]
pub enum ArchiverError {
    #[error("failed to start {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("{program} failed with {status}")]
    Failed { program: String, status: String },

    #[error("failed to write archive {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Packs a directory into a single archive file.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Returns the name of this archiver implementation.
    fn name(&self) -> &str;

    /// Archives every file under `source_dir` into `archive_path`.
    ///
    /// Entry names are relative to `source_dir`.
    async fn archive(
        &self,
        source_dir: &Path,
        archive_path: &Path,
        reporter: &mut ProgressReporter,
    ) -> Result<(), ArchiverError>;
}

/// Builds the archiver selected by the configuration.
pub fn from_config(config: &ArchiverConfig) -> Arc<dyn Archiver> {
    match config.backend {
        ArchiverBackend::Command => Arc::new(CommandArchiver::new(config.command.clone())),
        ArchiverBackend::Builtin => Arc::new(BuiltinArchiver::new()),
    }
}
