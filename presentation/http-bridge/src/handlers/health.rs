//! Health check handlers

use crate::{AppState, HealthStatus};
use axum::{extract::State, http::StatusCode, response::Json};

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let status = state.core_service.status().await;
    let (code, label) = if status.store_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let health = HealthStatus {
        status: label.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_network: status.active_network,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    (code, Json(health))
}
