//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::converter::AudioFormat;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base directory for per-request working areas.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Format used when a request does not name one.
    #[serde(default = "default_output_format")]
    pub output_format: AudioFormat,

    /// Archive filename prefix; the date stamp is appended.
    #[serde(default = "default_archive_prefix")]
    pub archive_prefix: String,

    /// A song list whose first line starts with one of these is used as is,
    /// without resolution.
    #[serde(default = "default_identifier_prefixes")]
    pub identifier_prefixes: Vec<String>,

    /// Capacity of the per-request progress channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_output_format() -> AudioFormat {
    AudioFormat::Mp3
}

fn default_archive_prefix() -> String {
    "songs".to_string()
}

fn default_identifier_prefixes() -> Vec<String> {
    ["spotify:", "apple_music:", "deezer:", "http://", "https://"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_event_buffer() -> usize {
    64
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            output_format: default_output_format(),
            archive_prefix: default_archive_prefix(),
            identifier_prefixes: default_identifier_prefixes(),
            event_buffer: default_event_buffer(),
        }
    }
}
