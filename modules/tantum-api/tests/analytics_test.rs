//! `/analytics` endpoint driven through the router, with workers writing to
//! an in-memory sink.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::util::ServiceExt;

use tantum_api::{build_router, AppState, MAX_BODY_BYTES};
use tantum_common::IngestError;
use tantum_events::{EventQueue, EventSink, WorkerPool};

#[derive(Default)]
struct RecordingSink {
    rows: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn insert(&self, user_id: &str, data: &str) -> Result<i32, IngestError> {
        let mut rows = self.rows.lock().unwrap();
        rows.push((user_id.to_string(), data.to_string()));
        Ok(rows.len() as i32)
    }
}

fn app(queue: &EventQueue) -> Router {
    build_router(Arc::new(AppState::new(queue.clone())))
}

fn analytics_request(headers: &[(&str, &str)], body: &'static str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/analytics");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body)).unwrap()
}

fn analytics_request_with_body(body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/analytics");
    for (name, value) in ALL_HEADERS {
        builder = builder.header(name, value);
    }
    builder.body(Body::from(body)).unwrap()
}

const ALL_HEADERS: [(&str, &str); 3] = [
    ("X-Tantum-Useragent", "abc"),
    ("X-Tantum-Authorization", "tok"),
    ("Content-Type", "application/json"),
];

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn accepted_event_is_written_once() {
    let queue = EventQueue::bounded(4).unwrap();
    let sink = Arc::new(RecordingSink::default());
    let workers = WorkerPool::spawn(2, queue.clone(), sink.clone());

    let response = app(&queue)
        .oneshot(analytics_request(&ALL_HEADERS, r#"{"x":1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(json_body(response).await, serde_json::json!({"status": "ok"}));

    queue.close().await;
    workers.join().await;

    let rows = sink.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].0,
        r#"{"user_agent":"abc","authorization":"tok","content_type":"application/json"}"#
    );
    assert_eq!(rows[0].1, r#"{"x":1}"#);
}

#[tokio::test]
async fn missing_any_header_is_rejected_without_queueing() {
    let queue = EventQueue::bounded(4).unwrap();
    let sink = Arc::new(RecordingSink::default());
    let workers = WorkerPool::spawn(1, queue.clone(), sink.clone());

    for skip in 0..ALL_HEADERS.len() {
        let headers: Vec<(&str, &str)> = ALL_HEADERS
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, h)| *h)
            .collect();

        let response = app(&queue)
            .oneshot(analytics_request(&headers, r#"{"x":1}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({"message": "missing required headers"})
        );
    }

    queue.close().await;
    workers.join().await;
    assert!(sink.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_body_is_accepted() {
    let queue = EventQueue::bounded(1).unwrap();

    let response = app(&queue)
        .oneshot(analytics_request(&ALL_HEADERS, ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let event = queue.dequeue().await.unwrap();
    assert!(event.body().is_empty());
}

#[tokio::test]
async fn closed_queue_returns_service_unavailable() {
    let queue = EventQueue::bounded(1).unwrap();
    queue.close().await;

    let response = app(&queue)
        .oneshot(analytics_request(&ALL_HEADERS, "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn analytics_only_accepts_post() {
    let queue = EventQueue::bounded(1).unwrap();
    let response = app(&queue)
        .oneshot(
            Request::builder()
                .uri("/analytics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn health_check() {
    let queue = EventQueue::bounded(1).unwrap();
    let response = app(&queue)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn bodies_up_to_the_limit_are_accepted() {
    let queue = EventQueue::bounded(1).unwrap();

    // Above axum's 2 MB default, within the configured limit.
    let body = vec![b'a'; 3 * 1024 * 1024];
    let response = app(&queue)
        .oneshot(analytics_request_with_body(body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let event = queue.dequeue().await.unwrap();
    assert_eq!(event.body().len(), 3 * 1024 * 1024);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let queue = EventQueue::bounded(1).unwrap();
    let response = app(&queue)
        .oneshot(analytics_request_with_body(vec![b'a'; MAX_BODY_BYTES + 1]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
