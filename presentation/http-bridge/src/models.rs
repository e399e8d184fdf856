//! Request and response bodies of the HTTP bridge

use netlens_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Body of every failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always "error"
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            kind: Some(kind),
            message: message.into(),
        }
    }

    /// Error without a machine-readable kind, e.g. an unknown route
    pub fn plain(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            kind: None,
            message: message.into(),
        }
    }
}

/// `GET /get_components`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentsResponse {
    pub components: Vec<ComponentType>,
}

/// `GET /networks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworksResponse {
    pub networks: Vec<String>,
    pub active: Option<String>,
}

/// Form of `POST /load_network`
#[derive(Debug, Clone, Deserialize)]
pub struct LoadNetworkForm {
    pub network: String,
}

/// `POST /load_network`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadNetworkResponse {
    /// Always "success"
    pub status: String,
    pub network: String,
    pub snapshots: usize,
    pub components: Vec<ComponentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced: Option<String>,
}

impl From<NetworkSummary> for LoadNetworkResponse {
    fn from(summary: NetworkSummary) -> Self {
        Self {
            status: "success".to_string(),
            network: summary.name,
            snapshots: summary.snapshots,
            components: summary.components,
            replaced: summary.replaced,
        }
    }
}

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub active_network: Option<String>,
    pub timestamp: String,
}
