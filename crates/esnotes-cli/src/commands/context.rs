use anyhow::{Context, Result};
use esnotes_core::config::RootConfig;
use esnotes_core::session::SessionStore;
use esnotes_infrastructure::{ConfigService, JsonSessionStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Resolved configuration and store shared by every command.
pub struct AppContext {
    pub config: RootConfig,
    pub store: Arc<JsonSessionStore>,
}

impl AppContext {
    /// Resolves the config file and data directory, command-line overrides first.
    pub fn build(config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config_service = match config_path {
            Some(path) => ConfigService::new(path),
            None => ConfigService::default_location()
                .context("Failed to locate the configuration file")?,
        };
        let config = config_service.get_config();

        let data_dir = match data_dir {
            Some(dir) => dir,
            None => config_service
                .data_dir()
                .context("Failed to resolve the data directory")?,
        };
        tracing::debug!("Using data directory {:?}", data_dir);

        Ok(Self {
            config,
            store: Arc::new(JsonSessionStore::new(data_dir)),
        })
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        self.store.clone()
    }
}
