use super::{types::Config, ConfigError};
use crate::archiver::ArchiverBackend;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Every external tool has a program configured
/// - The acquisition success marker is not empty
/// - Bitrate and event buffer are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let mut tools = vec![
        ("resolver.command.program", &config.resolver.command.program),
        ("acquisition.command.program", &config.acquisition.command.program),
        ("transcoder.ffmpeg_path", &config.transcoder.ffmpeg_path),
    ];
    if config.archiver.backend == ArchiverBackend::Command {
        tools.push(("archiver.command.program", &config.archiver.command.program));
    }
    for (key, program) in tools {
        if program.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(format!("{} cannot be empty", key)));
        }
    }

    if config.resolver.output_file.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "resolver.output_file cannot be empty".to_string(),
        ));
    }

    if config.acquisition.success_marker.is_empty() {
        return Err(ConfigError::ValidationError(
            "acquisition.success_marker cannot be empty".to_string(),
        ));
    }

    if config.transcoder.bitrate_kbps == Some(0) {
        return Err(ConfigError::ValidationError(
            "transcoder.bitrate_kbps cannot be 0".to_string(),
        ));
    }

    if config.pipeline.event_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.event_buffer cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ToolCommand;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_program_fails() {
        let mut config = Config::default();
        config.acquisition.command = ToolCommand::new("");
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("acquisition.command.program"));
    }

    #[test]
    fn test_validate_builtin_archiver_ignores_zip_program() {
        let mut config = Config::default();
        config.archiver.backend = ArchiverBackend::Builtin;
        config.archiver.command = ToolCommand::new("");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_marker_fails() {
        let mut config = Config::default();
        config.acquisition.success_marker = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_bitrate_fails() {
        let mut config = Config::default();
        config.transcoder.bitrate_kbps = Some(0);
        assert!(validate_config(&config).is_err());
    }
}
