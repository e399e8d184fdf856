//! HTTP bridge for the NetLens presentation layer
//!
//! Serves the query operations of a [`NetworkService`] over HTTP with the
//! route layout the network viewer frontend expects: `/get_components`,
//! `/get_attributes/:component`, `/get_data/:component/:attr/:kind`, plus
//! listing and loading of saved networks.

use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use netlens_core::prelude::*;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

mod handlers;
pub mod middleware;
mod models;

pub use models::*;

/// HTTP bridge server configuration
#[derive(Debug, Clone)]
pub struct HttpBridgeConfig {
    /// Server bind address
    pub bind_address: SocketAddr,
    /// Enable CORS
    pub enable_cors: bool,
    /// Request timeout in seconds
    pub request_timeout: u64,
}

impl Default for HttpBridgeConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 5000)),
            enable_cors: true,
            request_timeout: 30,
        }
    }
}

/// HTTP bridge presentation adapter
pub struct HttpBridge {
    config: HttpBridgeConfig,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
}

impl HttpBridge {
    /// Create a new HTTP bridge
    pub fn new(config: HttpBridgeConfig) -> Self {
        Self {
            config,
            shutdown: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &HttpBridgeConfig {
        &self.config
    }
}

/// Build the Axum router with all routes and middleware
pub fn build_router(core_service: Arc<dyn NetworkService>, config: HttpBridgeConfig) -> Router {
    let app_state = AppState {
        core_service,
        config: config.clone(),
    };

    let mut router = Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        .route("/v1/health", get(handlers::health::health_check))
        // Saved networks
        .route("/networks", get(handlers::network::list_networks))
        .route("/load_network", post(handlers::network::load_network))
        // Queries against the active network
        .route("/get_components", get(handlers::query::get_components))
        .route("/get_attributes/:component", get(handlers::query::get_attributes))
        .route("/get_data/:component/:attr/:kind", get(handlers::query::get_data))
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::request_timeout,
        ))
        .with_state(app_state);

    // Add middleware
    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::request_logging))
        .layer(CatchPanicLayer::custom(middleware::panic_response));

    if config.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(service_builder)
}

#[async_trait]
impl PresentationAdapter for HttpBridge {
    async fn start(&self, core_service: Arc<dyn NetworkService>) -> Result<(), PresentationError> {
        info!("Starting HTTP bridge server on {}", self.config.bind_address);

        let router = build_router(core_service, self.config.clone());

        let listener = tokio::net::TcpListener::bind(&self.config.bind_address)
            .await
            .map_err(|e| {
                PresentationError::StartupFailed(format!(
                    "Failed to bind to {}: {}",
                    self.config.bind_address, e
                ))
            })?;

        let (tx, rx) = oneshot::channel();
        *self.shutdown.lock().await = Some(tx);

        info!("HTTP bridge listening on {}", self.config.bind_address);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await
            .map_err(|e| PresentationError::StartupFailed(format!("Server error: {}", e)))?;

        info!("HTTP bridge stopped");
        Ok(())
    }

    async fn stop(&self) -> Result<(), PresentationError> {
        info!("Stopping HTTP bridge server");
        match self.shutdown.lock().await.take() {
            Some(tx) => tx
                .send(())
                .map_err(|_| PresentationError::ShutdownFailed("server already stopped".to_string())),
            None => {
                warn!("HTTP bridge was not running");
                Ok(())
            }
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub core_service: Arc<dyn NetworkService>,
    pub config: HttpBridgeConfig,
}

/// HTTP status of a query failure
pub fn query_status(error: &QueryError) -> StatusCode {
    match error {
        QueryError::NoModelLoaded => StatusCode::CONFLICT,
        QueryError::UnknownComponentType(_)
        | QueryError::NoStaticData(_)
        | QueryError::NoVaryingData(_)
        | QueryError::AttributeNotFound { .. }
        | QueryError::AttributeHasNoData { .. } => StatusCode::NOT_FOUND,
        QueryError::QueryFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert query errors to HTTP responses
pub fn handle_query_error(error: QueryError) -> Response {
    let status = query_status(&error);
    if status.is_server_error() {
        error!("API error: {} - {}", status, error);
    } else {
        warn!("API error: {} - {}", status, error);
    }
    (status, Json(ErrorBody::new(error.kind(), error.to_string()))).into_response()
}

/// Convert core errors to HTTP responses
pub fn handle_core_error(error: CoreError) -> Response {
    let (status, body) = match error {
        CoreError::Query(e) => return handle_query_error(e),
        CoreError::Load(e) => {
            let status = match e {
                LoadError::NotFound(_) => StatusCode::NOT_FOUND,
                LoadError::InvalidName(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, ErrorBody::new(e.kind(), e.to_string()))
        }
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new(ErrorKind::QueryFailed, other.to_string()),
        ),
    };

    error!("API error: {} - {}", status, body.message);
    (status, Json(body)).into_response()
}
