//! Listing and loading saved networks

use crate::{handle_core_error, AppState, LoadNetworkForm, LoadNetworkResponse, NetworksResponse};
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Json, Response},
};
use tracing::info;

/// `GET /networks`
pub async fn list_networks(State(state): State<AppState>) -> Response {
    match state.core_service.list_networks().await {
        Ok(networks) => Json(NetworksResponse {
            networks,
            active: state.core_service.active_network().await,
        })
        .into_response(),
        Err(e) => handle_core_error(e),
    }
}

/// `POST /load_network`, form field `network`
pub async fn load_network(State(state): State<AppState>, Form(form): Form<LoadNetworkForm>) -> Response {
    match state.core_service.load_network(&form.network).await {
        Ok(summary) => {
            info!(
                network = %summary.name,
                snapshots = summary.snapshots,
                "Network loaded"
            );
            Json(LoadNetworkResponse::from(summary)).into_response()
        }
        Err(e) => handle_core_error(e),
    }
}
