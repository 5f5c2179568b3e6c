//! User configuration loaded from `config.toml`

use crate::error::{CliError, Result};
use cellgraph_core::DEFAULT_VERSION;
use cellgraph_engine::engine::{Normalizer, Validator, accept_all, identity_normalizer};
use directories::ProjectDirs;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

const MAX_CONFIG_FILE_BYTES: u64 = 64 * 1024;

/// How cell names are rewritten before they are validated and stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMode {
    #[default]
    None,
    Upper,
    Lower,
}

impl FromStr for NormalizeMode {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(NormalizeMode::None),
            "upper" => Ok(NormalizeMode::Upper),
            "lower" => Ok(NormalizeMode::Lower),
            other => Err(CliError::Usage(format!(
                "Unknown normalize mode: {} (expected none, upper or lower)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Tag written on save and required on load
    pub version: String,
    pub normalize: NormalizeMode,
    /// Cell names must match this whole pattern, on top of the base syntax
    pub name_pattern: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: DEFAULT_VERSION.to_string(),
            normalize: NormalizeMode::None,
            name_pattern: None,
        }
    }
}

impl Config {
    pub fn normalizer(&self) -> Normalizer {
        match self.normalize {
            NormalizeMode::None => identity_normalizer(),
            NormalizeMode::Upper => Arc::new(|name: &str| name.to_uppercase()),
            NormalizeMode::Lower => Arc::new(|name: &str| name.to_lowercase()),
        }
    }

    pub fn validator(&self) -> Result<Validator> {
        let Some(pattern) = &self.name_pattern else {
            return Ok(accept_all());
        };
        let re = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Arc::new(move |name: &str| re.is_match(name)))
    }
}

/// `<config_dir>/cellgraph/config.toml` for the current platform.
pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellgraph")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str::<Config>(content)?)
}

/// Load the configuration.
///
/// An explicit path must exist. The per-user file is optional; when it is
/// missing the defaults apply.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match user_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(Config::default()),
        },
    };

    let read_err = |source| CliError::ConfigRead {
        path: path.clone(),
        source,
    };
    let size = fs::metadata(&path).map_err(read_err)?.len();
    if size > MAX_CONFIG_FILE_BYTES {
        return Err(CliError::ConfigTooLarge {
            path: path.clone(),
            size,
            max: MAX_CONFIG_FILE_BYTES,
        });
    }
    let content = fs::read_to_string(&path).map_err(read_err)?;
    log::debug!("Loaded config from {}", path.display());
    parse_config(&content)
}
