//! Configuration for the resolver stage.

use serde::{Deserialize, Serialize};

use crate::process::ToolCommand;

/// Configuration for the external query resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Resolver command; the input file path is appended as last argument.
    #[serde(default = "default_command")]
    pub command: ToolCommand,

    /// Name of the file the resolver writes in its working directory.
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

fn default_command() -> ToolCommand {
    ToolCommand::new("songbundle-resolve")
}

fn default_output_file() -> String {
    "spotify-urls.txt".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            output_file: default_output_file(),
        }
    }
}
