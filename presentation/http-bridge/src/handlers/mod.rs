//! HTTP request handlers for the HTTP bridge

pub mod health;
pub mod network;
pub mod query;

use crate::models::ErrorBody;
use axum::{http::{StatusCode, Uri}, response::Json};

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::plain(format!("no route for {}", uri.path()))),
    )
}
