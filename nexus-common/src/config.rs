//! Bootstrap configuration file resolution and loading
//!
//! Config file location follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/nexus/<file_name>`)
//!
//! A missing file is never fatal: callers get built-in defaults and a warning.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Logging section shared by all Nexus binaries
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolve which config file to read, if any
///
/// Returns `None` when no candidate exists; the caller then runs on defaults.
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    file_name: &str,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path(file_name).filter(|p| p.exists())
}

/// Platform default location for a Nexus config file
pub fn default_config_path(file_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nexus").join(file_name))
}

/// Load a TOML config file, falling back to `T::default()` when it is missing
///
/// A file that exists but fails to parse is an error: silently ignoring a
/// typo in a capacity limit would be worse than refusing to start.
pub fn load_toml_or_default<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        info!("No config file found, using built-in defaults");
        return Ok(T::default());
    };

    match std::fs::read_to_string(path) {
        Ok(content) => {
            let parsed = toml::from_str::<T>(&content)?;
            info!("Loaded configuration from {}", path.display());
            Ok(parsed)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Config file {} not found, using built-in defaults", path.display());
            Ok(T::default())
        }
        Err(e) => Err(Error::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))),
    }
}
