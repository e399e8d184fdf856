//! Middleware for the HTTP bridge

use crate::models::ErrorBody;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use netlens_core::ErrorKind;
use std::any::Any;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Header carrying the per-request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request logging middleware; tags every response with a request id
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = Uuid::new_v4();
    let start_time = Instant::now();

    debug!(%request_id, "Incoming request: {} {}", method, uri);

    let mut response = next.run(request).await;

    let duration = start_time.elapsed();
    let status = response.status();

    if status.is_success() {
        info!(%request_id, "{} {} - {} ({:?})", method, uri, status, duration);
    } else if status.is_client_error() {
        warn!(%request_id, "{} {} - {} ({:?})", method, uri, status, duration);
    } else {
        error!(%request_id, "{} {} - {} ({:?})", method, uri, status, duration);
    }

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Request timeout middleware, bounded by `request_timeout` of the config
pub async fn request_timeout(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let timeout_duration = Duration::from_secs(state.config.request_timeout);

    match tokio::time::timeout(timeout_duration, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!("Request timed out after {:?}", timeout_duration);
            (
                StatusCode::REQUEST_TIMEOUT,
                Json(ErrorBody::new(
                    ErrorKind::QueryFailed,
                    format!("request timed out after {:?}", timeout_duration),
                )),
            )
                .into_response()
        }
    }
}

/// Turn a panic inside a handler into a `QueryFailed` answer
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(
            ErrorKind::QueryFailed,
            format!("Query failed: {}", detail),
        )),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_panic_response_body() {
        let response = panic_response(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.kind, Some(ErrorKind::QueryFailed));
        assert!(body.message.contains("index out of bounds"));
    }
}
