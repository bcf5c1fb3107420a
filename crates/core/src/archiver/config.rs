//! Configuration for the archiving stage.

use serde::{Deserialize, Serialize};

use crate::process::ToolCommand;

/// Which archiver implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiverBackend {
    /// External `zip` compatible command.
    #[default]
    Command,
    /// In-process writer.
    Builtin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiverConfig {
    #[serde(default)]
    pub backend: ArchiverBackend,

    /// Archive command; the archive path and `.` are appended.
    #[serde(default = "default_command")]
    pub command: ToolCommand,
}

fn default_command() -> ToolCommand {
    ToolCommand::new("zip").with_args(["-0", "-r"])
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            backend: ArchiverBackend::default(),
            command: default_command(),
        }
    }
}
