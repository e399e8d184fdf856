//! Holder of the single active network model

use crate::errors::{QueryError, QueryResult};
use crate::model::NetworkModel;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Process-wide slot for the active network.
///
/// Replacement swaps the `Arc` under a write lock, so a reader holding a
/// snapshot from [`NetworkSession::get`] keeps seeing one complete model
/// even while another task loads a new one. The lock is never held across
/// a query.
#[derive(Debug, Default)]
pub struct NetworkSession {
    slot: RwLock<Option<Arc<NetworkModel>>>,
}

impl NetworkSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that already holds `model`
    pub fn with_model(model: NetworkModel) -> Self {
        Self {
            slot: RwLock::new(Some(Arc::new(model))),
        }
    }

    /// Snapshot of the active model
    pub async fn get(&self) -> QueryResult<Arc<NetworkModel>> {
        self.slot.read().await.clone().ok_or(QueryError::NoModelLoaded)
    }

    /// Replace the active model, returning the name of the one it replaced
    pub async fn set(&self, model: NetworkModel) -> Option<String> {
        let model = Arc::new(model);
        let name = model.name().to_string();
        let previous = self.slot.write().await.replace(model);
        let previous = previous.map(|m| m.name().to_string());
        info!(network = %name, previous = ?previous, "Active network replaced");
        previous
    }

    /// Drop the active model
    pub async fn clear(&self) {
        if let Some(previous) = self.slot.write().await.take() {
            debug!(network = %previous.name(), "Active network cleared");
        }
    }

    /// Name of the active model, if any
    pub async fn active_name(&self) -> Option<String> {
        self.slot.read().await.as_ref().map(|m| m.name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StaticTable;
    use crate::schema::AttributeSchema;

    fn named(name: &str) -> NetworkModel {
        NetworkModel::new(name, AttributeSchema::standard())
            .with_static("Bus", StaticTable::new([format!("{name}-bus")]))
    }

    #[tokio::test]
    async fn test_empty_session_reports_no_model() {
        let session = NetworkSession::new();
        assert_eq!(session.get().await.unwrap_err(), QueryError::NoModelLoaded);
        assert!(session.active_name().await.is_none());
    }

    #[tokio::test]
    async fn test_set_replaces_and_reports_previous() {
        let session = NetworkSession::new();
        assert_eq!(session.set(named("first")).await, None);
        assert_eq!(session.set(named("second")).await, Some("first".to_string()));
        assert_eq!(session.get().await.unwrap().name(), "second");

        session.clear().await;
        assert!(session.get().await.is_err());
    }

    #[tokio::test]
    async fn test_snapshot_survives_replacement() {
        let session = NetworkSession::with_model(named("old"));
        let held = session.get().await.unwrap();
        session.set(named("new")).await;

        assert_eq!(held.name(), "old");
        assert_eq!(held.static_table("Bus").unwrap().entities(), ["old-bus".to_string()]);
        assert_eq!(session.get().await.unwrap().name(), "new");
    }

    #[tokio::test]
    async fn test_concurrent_readers_never_see_mixed_models() {
        let session = Arc::new(NetworkSession::with_model(named("a")));

        let writer = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                for i in 0..50 {
                    let name = if i % 2 == 0 { "b" } else { "a" };
                    session.set(named(name)).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..8 {
            let session = Arc::clone(&session);
            readers.push(tokio::spawn(async move {
                for _ in 0..50 {
                    let model = session.get().await.unwrap();
                    let bus = &model.static_table("Bus").unwrap().entities()[0];
                    assert_eq!(bus, &format!("{}-bus", model.name()));
                    tokio::task::yield_now().await;
                }
            }));
        }

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
