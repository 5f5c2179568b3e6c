//! Error types for the cellgraph command-line front end

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading arguments or configuration
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("Failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config file {} is too large ({size} bytes, max {max})", path.display())]
    ConfigTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid name pattern: {0}")]
    NamePattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
