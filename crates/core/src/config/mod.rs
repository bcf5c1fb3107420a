//! Service configuration: one TOML file, every section optional.

mod loader;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_str};
pub use types::*;
pub use validate::validate_config;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    ParseError(String),

    #[error("configuration rejected: {0}")]
    ValidationError(String),
}
