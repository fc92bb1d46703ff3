//! HTTP query API tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use ranking::router::create_router;
use ranking::{AppState, RankedItem};
use serde_json::Value;
use tower::ServiceExt;

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, content_type, body)
}

fn seeded_state() -> AppState {
    let state = AppState::new();
    state.store.increment_by("A", 5);
    state.store.increment_by("B", 10);
    state.store.increment_by("A", 3);
    state.store.increment_by("C", 1);
    state
}

#[tokio::test]
async fn test_rankings_empty_store() {
    let app = create_router(AppState::new());
    let (status, content_type, body) = get(app, "/rankings").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_rankings_ordered_with_wire_field_names() {
    let app = create_router(seeded_state());
    let (status, _, body) = get(app, "/rankings").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!([
            {"productId": "B", "orders": 10},
            {"productId": "A", "orders": 8},
            {"productId": "C", "orders": 1},
        ])
    );

    let items: Vec<RankedItem> = serde_json::from_value(body).unwrap();
    assert_eq!(items[0], RankedItem::new("B", 10));
}

#[tokio::test]
async fn test_rankings_limit() {
    let app = create_router(seeded_state());
    let (status, _, body) = get(app, "/rankings?limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!([
            {"productId": "B", "orders": 10},
            {"productId": "A", "orders": 8},
        ])
    );
}

#[tokio::test]
async fn test_rankings_invalid_limit() {
    let app = create_router(seeded_state());
    let (status, _, body) = get(app, "/rankings?limit=lots").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_rankings_counted_in_metrics() {
    let state = seeded_state();
    let app = create_router(state.clone());

    get(app.clone(), "/rankings").await;
    get(app.clone(), "/rankings").await;

    let (status, _, body) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshots_served"], 2);
    assert!(body.get("snapshot_build_p99_ns").is_some());
}

#[tokio::test]
async fn test_health() {
    let app = create_router(seeded_state());
    let (status, _, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"status": "ok", "products": 3}));
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_router(AppState::new());
    let (status, _, body) = get(app, "/ranking").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}
