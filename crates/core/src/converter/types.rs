//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Target format of the delivered bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// MPEG Audio Layer III
    Mp3,
    /// AAC in an MPEG-4 container
    M4a,
}

impl AudioFormat {
    /// Parses a request or config name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "m4a" => Some(Self::M4a),
            _ => None,
        }
    }

    /// Format whose extension matches the file's, if any.
    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
        }
    }

    /// Returns the ffmpeg codec name for this format.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::Mp3 => "libmp3lame",
            Self::M4a => "aac",
        }
    }

    /// High quality bitrate used when none is configured.
    pub fn default_bitrate_kbps(&self) -> u32 {
        match self {
            Self::Mp3 => 320,
            Self::M4a => 256,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A single file conversion.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Input file path.
    pub input_path: PathBuf,
    /// Output file path. Overwritten if it exists.
    pub output_path: PathBuf,
    /// Target format.
    pub format: AudioFormat,
    /// Target bitrate in kbps.
    pub bitrate_kbps: u32,
}

impl ConversionJob {
    /// Creates a job at the format's default bitrate.
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        format: AudioFormat,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            format,
            bitrate_kbps: format.default_bitrate_kbps(),
        }
    }

    pub fn with_bitrate(mut self, bitrate_kbps: u32) -> Self {
        self.bitrate_kbps = bitrate_kbps;
        self
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Output file path.
    pub output_path: PathBuf,
    /// Output file size in bytes.
    pub output_size_bytes: u64,
    /// Conversion duration in milliseconds.
    pub duration_ms: u64,
    /// Input file extension.
    pub input_format: String,
    /// Output format used.
    pub output_format: AudioFormat,
}
