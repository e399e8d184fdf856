//! The NetLens service facade used by presentation adapters

use crate::errors::{CoreResult, QueryResult};
use crate::query::{self, ComponentAttributes, StaticTableView, VaryingSeries};
use crate::session::NetworkSession;
use crate::traits::{NetworkService, NetworkStore, NetworkSummary, ServiceStatus};
use crate::types::ComponentType;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Answers queries against the active network of a [`NetworkSession`] and
/// loads new networks from a [`NetworkStore`]
#[derive(Clone)]
pub struct NetworkInspector {
    session: Arc<NetworkSession>,
    store: Arc<dyn NetworkStore>,
}

impl NetworkInspector {
    pub fn new(store: Arc<dyn NetworkStore>) -> Self {
        Self::with_session(store, Arc::new(NetworkSession::new()))
    }

    pub fn with_session(store: Arc<dyn NetworkStore>, session: Arc<NetworkSession>) -> Self {
        Self { session, store }
    }

    pub fn session(&self) -> &Arc<NetworkSession> {
        &self.session
    }
}

#[async_trait]
impl NetworkService for NetworkInspector {
    async fn list_networks(&self) -> CoreResult<Vec<String>> {
        Ok(self.store.list_networks().await?)
    }

    async fn load_network(&self, name: &str) -> CoreResult<NetworkSummary> {
        info!(network = %name, "Loading network");

        // the active model stays in place until the new one is fully built
        let model = match self.store.load_network(name).await {
            Ok(model) => model,
            Err(e) => {
                error!(network = %name, error = %e, "Failed to load network");
                return Err(e.into());
            }
        };

        let summary_name = model.name().to_string();
        let snapshots = model.snapshots().len();
        let components = query::list_present_component_types(&model);
        let replaced = self.session.set(model).await;

        Ok(NetworkSummary {
            name: summary_name,
            snapshots,
            components,
            replaced,
        })
    }

    async fn list_component_types(&self) -> QueryResult<Vec<ComponentType>> {
        let model = self.session.get().await?;
        Ok(query::list_present_component_types(&model))
    }

    async fn classify_attributes(&self, component: &str) -> QueryResult<ComponentAttributes> {
        let model = self.session.get().await?;
        query::classify_attributes(&model, component)
    }

    async fn static_table(&self, component: &str) -> QueryResult<StaticTableView> {
        let model = self.session.get().await?;
        query::static_table(&model, component)
    }

    async fn varying_series(&self, component: &str, attribute: &str) -> QueryResult<VaryingSeries> {
        let model = self.session.get().await?;
        debug!(network = %model.name(), component, attribute, "Varying series requested");
        query::varying_series(&model, component, attribute)
    }

    async fn active_network(&self) -> Option<String> {
        self.session.active_name().await
    }

    async fn status(&self) -> ServiceStatus {
        let store_healthy = match self.store.health_check().await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Network store health check failed");
                false
            }
        };
        ServiceStatus {
            store_healthy,
            active_network: self.session.active_name().await,
        }
    }
}
