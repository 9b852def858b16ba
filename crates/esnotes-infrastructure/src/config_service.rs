//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the root configuration
//! from the configuration file (~/.config/esnotes/config.toml).

use crate::paths::EsnotesPaths;
use crate::storage::AtomicFile;
use esnotes_core::config::RootConfig;
use esnotes_core::{EsnotesError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the root configuration.
///
/// A missing config file is created with the defaults on first load.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService reading `path`.
    ///
    /// The configuration is loaded lazily on first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a ConfigService for the default config file location.
    pub fn default_location() -> Result<Self> {
        let path = EsnotesPaths::config_file()
            .map_err(|e| EsnotesError::config(format!("Failed to get config path: {}", e)))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// An unreadable file falls back to the defaults (logged) without being overwritten.
    pub fn get_config(&self) -> RootConfig {
        if let Ok(read_lock) = self.config.read() {
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = self.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config from {:?}, using defaults: {}", self.path, e);
            RootConfig::default()
        });

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    /// Reads the config file, writing the defaults first if it doesn't exist.
    pub fn load(&self) -> Result<RootConfig> {
        let file = AtomicFile::<RootConfig>::toml(self.path.clone());
        match file.load()? {
            Some(config) => {
                tracing::debug!("Loaded config from {:?}", self.path);
                Ok(config)
            }
            None => {
                let config = RootConfig::default();
                file.save(&config)?;
                tracing::info!("Created default config at {:?}", self.path);
                Ok(config)
            }
        }
    }

    /// Resolves the directory holding session data.
    ///
    /// Precedence: `[storage].data_dir` in the config, then the platform data directory
    /// (which itself honours `ESNOTES_DATA_DIR`).
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = self.get_config().storage.data_dir {
            return Ok(dir);
        }
        EsnotesPaths::data_dir()
            .map_err(|e| EsnotesError::config(format!("Failed to get data directory: {}", e)))
    }
}
