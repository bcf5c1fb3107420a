//! Configuration for the acquisition stage.

use serde::{Deserialize, Serialize};

use crate::process::ToolCommand;

/// Configuration for the external acquisition tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Acquisition command and its leading arguments.
    #[serde(default = "default_command")]
    pub command: ToolCommand,

    /// Flag introducing the input file.
    #[serde(default = "default_input_flag")]
    pub input_flag: String,

    /// Flag introducing the output directory.
    #[serde(default = "default_output_flag")]
    pub output_flag: String,

    /// Flags that suppress banners, headers and progress bars.
    #[serde(default = "default_quiet_flags")]
    pub quiet_flags: Vec<String>,

    /// Substring present on exactly one line per completed track.
    #[serde(default = "default_success_marker")]
    pub success_marker: String,

    /// Substrings that disqualify a line carrying the success marker.
    #[serde(default = "default_exclude_markers")]
    pub exclude_markers: Vec<String>,
}

fn default_command() -> ToolCommand {
    ToolCommand::new("freyr").with_args(["get"])
}

fn default_input_flag() -> String {
    "-i".to_string()
}

fn default_output_flag() -> String {
    "-d".to_string()
}

fn default_quiet_flags() -> Vec<String> {
    vec![
        "--no-logo".to_string(),
        "--no-header".to_string(),
        "--no-bar".to_string(),
    ]
}

fn default_success_marker() -> String {
    "[✓] Got raw track file".to_string()
}

fn default_exclude_markers() -> Vec<String> {
    vec!["album art".to_string(), "metadata".to_string()]
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            input_flag: default_input_flag(),
            output_flag: default_output_flag(),
            quiet_flags: default_quiet_flags(),
            success_marker: default_success_marker(),
            exclude_markers: default_exclude_markers(),
        }
    }
}
