//! Core traits defining the seams between NetLens crates

use crate::errors::{CoreResult, LoadResult, PresentationError, QueryResult};
use crate::model::NetworkModel;
use crate::query::{ComponentAttributes, StaticTableView, VaryingSeries};
use crate::types::ComponentType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Source of saved networks
#[async_trait]
pub trait NetworkStore: Send + Sync {
    /// Identifiers that `load_network` accepts
    async fn list_networks(&self) -> LoadResult<Vec<String>>;

    /// Build the complete model stored under `name`
    async fn load_network(&self, name: &str) -> LoadResult<NetworkModel>;

    /// Test that the backing storage is reachable
    async fn health_check(&self) -> LoadResult<()>;
}

/// Summary of a network after it became active
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub name: String,
    pub snapshots: usize,
    pub components: Vec<ComponentType>,
    /// Name of the network it replaced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced: Option<String>,
}

/// Service health as reported to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub store_healthy: bool,
    pub active_network: Option<String>,
}

/// Core service interface that presentation adapters interact with
#[async_trait]
pub trait NetworkService: Send + Sync {
    /// Networks available in the store
    async fn list_networks(&self) -> CoreResult<Vec<String>>;

    /// Load `name` from the store and make it the active network
    async fn load_network(&self, name: &str) -> CoreResult<NetworkSummary>;

    /// Component types of the active network that hold data
    async fn list_component_types(&self) -> QueryResult<Vec<ComponentType>>;

    /// Static and varying attribute names of a component type
    async fn classify_attributes(&self, component: &str) -> QueryResult<ComponentAttributes>;

    /// Static table of a component type
    async fn static_table(&self, component: &str) -> QueryResult<StaticTableView>;

    /// One varying attribute of a component type
    async fn varying_series(&self, component: &str, attribute: &str) -> QueryResult<VaryingSeries>;

    /// Name of the active network
    async fn active_network(&self) -> Option<String>;

    /// Get service health status
    async fn status(&self) -> ServiceStatus;
}

/// Trait for presentation adapters (network transport layers)
#[async_trait]
pub trait PresentationAdapter: Send + Sync {
    /// Start the presentation adapter with a reference to the core service
    async fn start(&self, core_service: Arc<dyn NetworkService>) -> Result<(), PresentationError>;

    /// Stop the presentation adapter gracefully
    async fn stop(&self) -> Result<(), PresentationError>;
}
