//! In-memory implementation of NetworkStore for testing and development

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use netlens_core::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Name under which [`InMemoryStore::with_demo`] registers the demo network
pub const DEMO_NETWORK: &str = "simple_network";

/// In-memory NetworkStore implementation
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    networks: Arc<RwLock<BTreeMap<String, NetworkModel>>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding [`demo_network`]
    pub async fn with_demo() -> Self {
        let store = Self::new();
        store.insert(DEMO_NETWORK, demo_network()).await;
        store
    }

    /// Register a network under `name`, replacing any previous one
    pub async fn insert(&self, name: impl Into<String>, model: NetworkModel) {
        let name = name.into();
        info!(network = %name, entities = model.entity_count(), "Registering in-memory network");
        self.networks.write().await.insert(name, model);
    }

    /// Remove a network, returning whether it existed
    pub async fn remove(&self, name: &str) -> bool {
        self.networks.write().await.remove(name).is_some()
    }

    /// Number of registered networks
    pub async fn len(&self) -> usize {
        self.networks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.networks.read().await.is_empty()
    }
}

#[async_trait]
impl NetworkStore for InMemoryStore {
    async fn list_networks(&self) -> LoadResult<Vec<String>> {
        Ok(self.networks.read().await.keys().cloned().collect())
    }

    async fn load_network(&self, name: &str) -> LoadResult<NetworkModel> {
        let networks = self.networks.read().await;
        let model = networks
            .get(name)
            .ok_or_else(|| LoadError::NotFound(name.to_string()))?;
        debug!(network = %name, "Serving in-memory network");
        Ok(model.clone())
    }

    async fn health_check(&self) -> LoadResult<()> {
        debug!("In-memory store health check: {} networks", self.len().await);
        Ok(())
    }
}

/// Three-bus network over three hourly snapshots from 2024-01-01.
///
/// Generators keep their varying data in the columnar layout, loads in the
/// keyed layout. `Gen1.p_max_pu` ends with a NaN.
pub fn demo_network() -> NetworkModel {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let snapshots: Vec<Snapshot> = (0..3).map(|h| start + Duration::hours(h)).collect();

    NetworkModel::new(DEMO_NETWORK, AttributeSchema::standard())
        .with_snapshots(snapshots.clone())
        .with_static(
            "Carrier",
            StaticTable::new(["AC"]).with_column("co2_emissions", [0.0]),
        )
        .with_static(
            "Bus",
            StaticTable::new(["Bus1", "Bus2", "Bus3"])
                .with_column("v_nom", [1.0, 1.0, 1.0])
                .with_column("carrier", ["AC", "AC", "AC"]),
        )
        .with_static(
            "Link",
            StaticTable::new(["Link1", "Link2"])
                .with_column("bus0", ["Bus1", "Bus2"])
                .with_column("bus1", ["Bus2", "Bus3"])
                .with_column("p_nom", [100.0, 100.0])
                .with_column("efficiency", [1.0, 1.0]),
        )
        .with_static(
            "Load",
            StaticTable::new(["Load1"]).with_column("bus", ["Bus3"]),
        )
        .with_static(
            "Generator",
            StaticTable::new(["Gen1", "Gen2"])
                .with_column("bus", ["Bus1", "Bus2"])
                .with_column("p_nom", [30.0, 40.0])
                .with_column("marginal_cost", [50.0, 30.0]),
        )
        .with_varying(
            "Generator",
            ColumnarStore::new().with_column("p_max_pu", "Gen1", vec![0.5, 0.8, f64::NAN]),
        )
        .with_varying(
            "Load",
            KeyedStore::new()
                .with_frame(
                    "p_set",
                    SeriesFrame::new(snapshots).with_column("Load1", vec![10.0, 15.0, 20.0]),
                )
                .with_frame("q_set", SeriesFrame::default()),
        )
        .with_varying("Link", KeyedStore::new())
}
