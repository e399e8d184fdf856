//! Configuration types for the JSON file store

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where saved networks live on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonFileStoreConfig {
    /// Folder scanned for network files
    pub folder: PathBuf,
    /// File extension of network files, without the dot
    pub extension: String,
}

impl Default for JsonFileStoreConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("SavedNetworks"),
            extension: "json".to_string(),
        }
    }
}

impl JsonFileStoreConfig {
    /// Create a new config reading from `folder`
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            ..Default::default()
        }
    }

    /// Set the file extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }
}
