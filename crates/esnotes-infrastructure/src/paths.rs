//! Unified path management for esnotes files.
//!
//! Resolves the configuration and data directories for the current platform,
//! honouring environment overrides.

use std::path::PathBuf;

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "ESNOTES_CONFIG_DIR";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "ESNOTES_DATA_DIR";

const APP_NAME: &str = "esnotes";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for esnotes.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/esnotes/           # Config directory ($ESNOTES_CONFIG_DIR)
/// └── config.toml              # Application configuration
///
/// ~/.local/share/esnotes/      # Data directory ($ESNOTES_DATA_DIR or [storage].data_dir)
/// └── sessions.json            # Persisted session collection
/// ```
pub struct EsnotesPaths;

impl EsnotesPaths {
    fn from_env(name: &str) -> Option<PathBuf> {
        std::env::var_os(name)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    /// Returns the esnotes configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/esnotes/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        if let Some(dir) = Self::from_env(CONFIG_DIR_ENV) {
            return Ok(dir);
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the esnotes data directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to data directory (e.g., `~/.local/share/esnotes/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn data_dir() -> Result<PathBuf, PathError> {
        if let Some(dir) = Self::from_env(DATA_DIR_ENV) {
            return Ok(dir);
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
