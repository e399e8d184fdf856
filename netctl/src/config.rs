//! Configuration management for netctl

use crate::cli::{Cli, OutputFormat};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use netlens_core::errors::CoreError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Configuration for the netctl CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetctlConfig {
    /// NetLens API endpoint
    pub endpoint: String,
    /// Default output format
    pub default_format: OutputFormat,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Folder of saved networks used by `serve`
    pub networks_folder: PathBuf,
    /// Address `serve` listens on
    pub bind_address: SocketAddr,
    /// Enable CORS on the served API
    pub enable_cors: bool,
}

impl Default for NetctlConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000".to_string(),
            default_format: OutputFormat::Table,
            timeout: 30,
            networks_folder: PathBuf::from("SavedNetworks"),
            bind_address: SocketAddr::from(([0, 0, 0, 0], 5000)),
            enable_cors: true,
        }
    }
}

impl NetctlConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: &Option<PathBuf>) -> Result<Self, CoreError> {
        let mut figment = Figment::from(Serialized::defaults(NetctlConfig::default()));

        // Load from default config file if it exists
        let default_config_paths = ["netctl.yaml", "netctl.yml", ".netctl.yaml", ".netctl.yml"];

        if let Some(path) = default_config_paths.iter().find(|p| Path::new(p).exists()) {
            figment = figment.merge(Yaml::file(path));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Yaml::file(path));
            } else {
                return Err(CoreError::Configuration(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
        }

        // Load from environment variables (prefixed with NETCTL_)
        figment = figment.merge(Env::prefixed("NETCTL_"));

        figment
            .extract()
            .map_err(|e| CoreError::Configuration(format!("Failed to parse configuration: {}", e)))
    }

    /// Apply CLI argument overrides to the configuration
    pub fn with_overrides(mut self, args: &Cli) -> Self {
        if let Some(ref endpoint) = args.endpoint {
            self.endpoint = endpoint.clone();
        }

        if let Some(ref format) = args.format {
            self.default_format = format.clone();
        }

        self
    }

    /// Build the URL of an API route from its path segments
    pub fn api_url(&self, segments: &[&str]) -> Result<reqwest::Url, CoreError> {
        let mut url = reqwest::Url::parse(&self.endpoint).map_err(|e| {
            CoreError::Configuration(format!("Invalid endpoint {}: {}", self.endpoint, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                CoreError::Configuration(format!("Endpoint {} cannot be a base URL", self.endpoint))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
