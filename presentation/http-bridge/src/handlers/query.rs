//! Query handlers against the active network

use crate::{handle_query_error, AppState, ComponentsResponse, ErrorBody};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::debug;

/// `GET /get_components`
pub async fn get_components(State(state): State<AppState>) -> Response {
    match state.core_service.list_component_types().await {
        Ok(components) => Json(ComponentsResponse { components }).into_response(),
        Err(e) => handle_query_error(e),
    }
}

/// `GET /get_attributes/:component`
pub async fn get_attributes(State(state): State<AppState>, Path(component): Path<String>) -> Response {
    match state.core_service.classify_attributes(&component).await {
        Ok(attributes) => Json(attributes).into_response(),
        Err(e) => handle_query_error(e),
    }
}

/// `GET /get_data/:component/all/static` and `GET /get_data/:component/:attr/varying`
pub async fn get_data(
    State(state): State<AppState>,
    Path((component, attr, kind)): Path<(String, String, String)>,
) -> Response {
    debug!("get_data {} {} {}", component, attr, kind);

    let result = match (kind.as_str(), attr.as_str()) {
        ("static", "all") => state
            .core_service
            .static_table(&component)
            .await
            .map(|table| Json(table).into_response()),
        ("varying", _) => state
            .core_service
            .varying_series(&component, &attr)
            .await
            .map(|series| Json(series).into_response()),
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorBody::plain(format!(
                    "unsupported data request {}/{}; use all/static or <attribute>/varying",
                    attr, kind
                ))),
            )
                .into_response()
        }
    };

    result.unwrap_or_else(handle_query_error)
}
