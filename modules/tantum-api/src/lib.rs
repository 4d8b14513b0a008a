use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tantum_events::EventQueue;

pub mod rest;

/// Largest accepted request body. Bigger requests get 413 before validation.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Shared handles for request handlers. Built once in `main`.
pub struct AppState {
    pub queue: EventQueue,
}

impl AppState {
    pub fn new(queue: EventQueue) -> Self {
        Self { queue }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        .route("/analytics", post(rest::analytics::api_analytics))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        // Logging layer: method + path + status + latency
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
