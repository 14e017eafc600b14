//! Subcommand implementations.

pub mod append;
pub mod get;
pub mod list;
pub mod meta;
pub mod stats;

use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use tracker_store::{EventStore, StoreConfig, StoreError};

/// Store location options shared by every subcommand.
pub struct StoreArgs {
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Errors raised before the store itself is reached.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("--data-dir is required (or a --config file with data_dir)")]
    MissingDataDir,
    #[error("failed to read input {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreArgs {
    /// Resolves the configuration: the config file first, then --data-dir.
    pub fn resolve(&self) -> Result<StoreConfig, Box<dyn std::error::Error>> {
        match (&self.config, &self.data_dir) {
            (Some(path), data_dir) => {
                let mut config = StoreConfig::from_json_file(path)?;
                if let Some(dir) = data_dir {
                    config.data_dir = dir.clone();
                }
                Ok(config)
            }
            (None, Some(dir)) => Ok(StoreConfig::new(dir)),
            (None, None) => Err(CliError::MissingDataDir.into()),
        }
    }

    /// Opens the store, recovering its index.
    pub fn open(&self) -> Result<EventStore, Box<dyn std::error::Error>> {
        let config = self.resolve()?;
        debug!(data_dir = %config.data_dir.display(), "opening store");
        let store = EventStore::open(config).map_err(|e: StoreError| {
            format!("Failed to open store: {}", e)
        })?;
        Ok(store)
    }
}
