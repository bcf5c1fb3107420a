//! Pipeline error taxonomy.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::acquisition::AcquisitionError;
use crate::archiver::ArchiverError;
use crate::request::InputError;
use crate::resolver::ResolverError;
use crate::transcode::TranscodeError;
use crate::workarea::WorkAreaError;

/// Every way a request can fail. The `Display` text is what the caller sees
/// in the terminal error event.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid request: {0}")]
    Input(#[from] InputError),

    #[error("could not prepare working area: {0}")]
    WorkArea(#[from] WorkAreaError),

    #[error("song conversion failed: {0}")]
    Resolution(#[from] ResolverError),

    #[error("download failed: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("audio conversion failed: {0}")]
    Transcoding(#[from] TranscodeError),

    #[error("no audio files were downloaded")]
    NoAudioFiles,

    #[error("archiving failed: {0}")]
    Archiving(#[from] ArchiverError),

    #[error("could not read archive {path}: {source}")]
    Payload { path: PathBuf, source: io::Error },
}
