//! Store configuration.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracker_journal::JournalOptions;

/// Sub-directory of the data directory holding both logs.
const JOURNAL_DIR: &str = "event_journal";
/// Payload log directory, under [`JOURNAL_DIR`].
const PAYLOAD_DIR: &str = "payloads";
/// Metadata log directory, under [`JOURNAL_DIR`].
const METADATA_DIR: &str = "metadata";

/// Options for opening an [`EventStore`](crate::EventStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base directory; both logs live underneath it (default: `./data`).
    pub data_dir: PathBuf,
    /// Initial number of index slots (default: 1024).
    pub initial_capacity: usize,
    /// Options shared by the payload and metadata logs.
    pub journal: JournalOptions,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            initial_capacity: 1024,
            journal: JournalOptions::default(),
        }
    }
}

impl StoreConfig {
    /// Default configuration rooted at `data_dir`.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Loads a configuration from a JSON file. Missing fields keep their
    /// defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Checks values that would make the store unusable.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.initial_capacity == 0 {
            return Err(StoreError::Config(
                "initial_capacity must be at least 1".to_string(),
            ));
        }
        if self.journal.max_segment_size == 0 {
            return Err(StoreError::Config(
                "journal.max_segment_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory of the payload log.
    pub fn payload_dir(&self) -> PathBuf {
        self.data_dir.join(JOURNAL_DIR).join(PAYLOAD_DIR)
    }

    /// Directory of the metadata log.
    pub fn metadata_dir(&self) -> PathBuf {
        self.data_dir.join(JOURNAL_DIR).join(METADATA_DIR)
    }
}
