use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use tantum_events::{validate_headers, QueueError};
use tracing::{debug, warn};

use crate::AppState;

/// `POST /analytics`: validate headers, queue the event, acknowledge.
///
/// 202 means the event entered the pipeline, not that it was stored.
/// Waits here while the queue is full.
pub async fn api_analytics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let event = match validate_headers(&headers, body) {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "Rejected analytics event");
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"message": "missing required headers"})),
            )
                .into_response();
        }
    };

    match state.queue.enqueue(event).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({"status": "ok"})),
        )
            .into_response(),
        Err(QueueError::Closed(_)) => {
            warn!("Event queue closed, rejecting analytics event");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"message": "shutting down"})),
            )
                .into_response()
        }
    }
}
