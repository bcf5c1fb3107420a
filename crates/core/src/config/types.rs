use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::acquisition::AcquisitionConfig;
use crate::archiver::{ArchiverBackend, ArchiverConfig};
use crate::availability::AvailabilityConfig;
use crate::converter::{AudioFormat, ConverterConfig};
use crate::pipeline::PipelineConfig;
use crate::process::ToolCommand;
use crate::resolver::ResolverConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    #[serde(default)]
    pub transcoder: ConverterConfig,
    #[serde(default)]
    pub archiver: ArchiverConfig,
    #[serde(default)]
    pub availability: AvailabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Sanitized config for API responses.
///
/// Tool arguments may carry provider credentials, so only the program
/// names and argument counts are exposed.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub pipeline: SanitizedPipelineConfig,
    pub tools: SanitizedToolsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedPipelineConfig {
    pub work_dir: PathBuf,
    pub output_format: AudioFormat,
    pub archive_prefix: String,
    pub identifier_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedToolsConfig {
    pub resolver: SanitizedTool,
    pub acquisition: SanitizedTool,
    pub transcoder: SanitizedTool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archiver: Option<SanitizedTool>,
    pub archiver_backend: ArchiverBackend,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTool {
    pub program: String,
    pub arg_count: usize,
}

impl From<&ToolCommand> for SanitizedTool {
    fn from(command: &ToolCommand) -> Self {
        Self {
            program: command.program.display().to_string(),
            arg_count: command.args.len(),
        }
    }
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            pipeline: SanitizedPipelineConfig {
                work_dir: config.pipeline.work_dir.clone(),
                output_format: config.pipeline.output_format,
                archive_prefix: config.pipeline.archive_prefix.clone(),
                identifier_prefixes: config.pipeline.identifier_prefixes.clone(),
            },
            tools: SanitizedToolsConfig {
                resolver: SanitizedTool::from(&config.resolver.command),
                acquisition: SanitizedTool::from(&config.acquisition.command),
                transcoder: SanitizedTool {
                    program: config.transcoder.ffmpeg_path.display().to_string(),
                    arg_count: config.transcoder.extra_ffmpeg_args.len(),
                },
                archiver: match config.archiver.backend {
                    ArchiverBackend::Command => Some(SanitizedTool::from(&config.archiver.command)),
                    ArchiverBackend::Builtin => None,
                },
                archiver_backend: config.archiver.backend,
            },
        }
    }
}
