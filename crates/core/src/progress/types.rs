//! Types for the progress module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage, in the order a request moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Init,
    /// Query to identifier resolution.
    Convert,
    Download,
    /// Transcoding of acquired files.
    ConvertAudio,
    Zip,
    Complete,
    Error,
}

impl Stage {
    /// Wire name of the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Convert => "convert",
            Self::Download => "download",
            Self::ConvertAudio => "convert-audio",
            Self::Zip => "zip",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    /// Inclusive percentage band reserved for this stage.
    pub fn band(&self) -> (u8, u8) {
        match self {
            Self::Init => (0, 5),
            Self::Convert => (5, 10),
            Self::Download => (15, 80),
            Self::ConvertAudio => (85, 90),
            Self::Zip => (90, 90),
            Self::Complete => (100, 100),
            Self::Error => (0, 100),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps `done / total` linearly into the stage's band.
///
/// `done` beyond `total` is clamped to the band's upper bound; a zero total
/// yields the lower bound.
pub fn band_position(stage: Stage, done: usize, total: usize) -> u8 {
    let (low, high) = stage.band();
    if total == 0 {
        return low;
    }
    let done = done.min(total);
    let span = usize::from(high - low);
    low + (span * done / total) as u8
}

/// One event on the progress stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage: Stage,
    /// Human readable status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Raw output line from an external tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    /// Overall progress, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    /// Suggested archive filename (terminal success only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Base64 encoded archive (terminal success only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl ProgressEvent {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            message: None,
            log: None,
            progress: None,
            filename: None,
            data: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_log(mut self, log: impl Into<String>) -> Self {
        self.log = Some(log.into());
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }
}
