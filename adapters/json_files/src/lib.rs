//! JSON file adapter for the NetLens NetworkStore trait
//!
//! Every file with the configured extension in the configured folder is one
//! saved network. See [`document`] for the file layout.

use async_trait::async_trait;
use netlens_core::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

mod config;
mod convert;
pub mod document;

pub use config::JsonFileStoreConfig;
pub use convert::parse_snapshot;

/// NetworkStore reading saved networks from a folder of JSON files
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    config: JsonFileStoreConfig,
}

impl JsonFileStore {
    pub fn new(config: JsonFileStoreConfig) -> Self {
        info!(
            "Using saved networks from {} (*.{})",
            config.folder.display(),
            config.extension
        );
        Self { config }
    }

    pub fn config(&self) -> &JsonFileStoreConfig {
        &self.config
    }

    /// Resolve a network name to a file inside the folder
    fn path_for(&self, name: &str) -> LoadResult<PathBuf> {
        let invalid = name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
            || Path::new(name).is_absolute();
        if invalid {
            return Err(LoadError::InvalidName(name.to_string()));
        }

        let file = if self.has_extension(Path::new(name)) {
            name.to_string()
        } else {
            format!("{}.{}", name, self.config.extension)
        };
        Ok(self.config.folder.join(file))
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.config.extension))
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(JsonFileStoreConfig::default())
    }
}

#[async_trait]
impl NetworkStore for JsonFileStore {
    async fn list_networks(&self) -> LoadResult<Vec<String>> {
        let folder = &self.config.folder;
        let mut entries = match tokio::fs::read_dir(folder).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Network folder {} does not exist", folder.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(LoadError::Io {
                    path: folder.display().to_string(),
                    source: e,
                })
            }
        };

        let io_error = |e: std::io::Error| LoadError::Io {
            path: folder.display().to_string(),
            source: e,
        };
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            let is_file = entry.file_type().await.map_err(io_error)?.is_file();
            if !is_file || !self.has_extension(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }

        names.sort();
        debug!("Found {} saved networks in {}", names.len(), folder.display());
        Ok(names)
    }

    async fn load_network(&self, name: &str) -> LoadResult<NetworkModel> {
        let path = self.path_for(name)?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound(name.to_string()))
            }
            Err(e) => {
                return Err(LoadError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };

        let doc: document::NetworkDocument =
            serde_json::from_str(&text).map_err(|e| LoadError::Parse {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name)
            .to_string();
        let model = convert::build_model(&stem, doc)?;
        info!(
            "Loaded network {} from {} ({} snapshots, {} entities)",
            model.name(),
            path.display(),
            model.snapshots().len(),
            model.entity_count()
        );
        Ok(model)
    }

    async fn health_check(&self) -> LoadResult<()> {
        let folder = &self.config.folder;
        match tokio::fs::metadata(folder).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(LoadError::Io {
                path: folder.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
            }),
            Err(e) => Err(LoadError::Io {
                path: folder.display().to_string(),
                source: e,
            }),
        }
    }
}
