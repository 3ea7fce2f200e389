//! End-to-end tests through the axum router.

mod support;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use todoist_bridge_rs::config::BridgeConfig;
use todoist_bridge_rs::handler::Bridge;
use todoist_bridge_rs::server::{router, BRIDGE_PATH, LEGACY_BRIDGE_PATH};
use tower::ServiceExt;

use support::{FakeTodoist, SECRET};

fn offline_router() -> Router {
    let config = BridgeConfig::new(SECRET).unwrap();
    router(Arc::new(Bridge::new(config).unwrap()))
}

fn post(uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

const VALID: &str = r#"{"project":{"title":"T"},"subtasks":[{"content":"A"},{"content":"B"}]}"#;

#[tokio::test]
async fn test_get_is_method_not_allowed() {
    let response = offline_router()
        .oneshot(Request::builder().uri(BRIDGE_PATH).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[header::ALLOW], "POST");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body,
        json!({"error": "Method not allowed", "hint": "Use POST with JSON body"})
    );
}

#[tokio::test]
async fn test_missing_secret_is_unauthorized() {
    let request = post(BRIDGE_PATH).body(Body::from(VALID)).unwrap();
    let (status, body) = send(offline_router(), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(body["hint"], "x-task-push-secret / Bearer mismatch");
}

#[tokio::test]
async fn test_wrong_bearer_is_unauthorized() {
    let request = post(BRIDGE_PATH)
        .header(header::AUTHORIZATION, "Bearer nope")
        .body(Body::from(VALID))
        .unwrap();
    let (status, _) = send(offline_router(), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_invalid_body() {
    let request = post(BRIDGE_PATH)
        .header("x-task-push-secret", SECRET)
        .body(Body::from("{\"project\":"))
        .unwrap();
    let (status, body) = send(offline_router(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid JSON body"}));
}

#[tokio::test]
async fn test_empty_body_is_bad_payload() {
    let request = post(BRIDGE_PATH)
        .header("x-task-push-secret", SECRET)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(offline_router(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad payload");
    assert_eq!(
        body["expected"],
        "{ project: { title, todoist_project_id? }, subtasks: [{ content, ... }] }"
    );
}

fn oversized_body() -> Body {
    // Past the 2 MiB default body limit.
    let padding = "x".repeat(3 * 1024 * 1024);
    Body::from(format!(
        r#"{{"project":{{"title":"T","description":"{}"}},"subtasks":[]}}"#,
        padding
    ))
}

#[tokio::test]
async fn test_oversized_body_is_invalid_json_envelope() {
    let request = post(&format!("{}?dryRun=true", BRIDGE_PATH))
        .header("x-task-push-secret", SECRET)
        .body(oversized_body())
        .unwrap();
    let response = offline_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"error": "Invalid JSON body"}));
}

#[tokio::test]
async fn test_oversized_body_without_secret_is_unauthorized() {
    let request = post(BRIDGE_PATH).body(oversized_body()).unwrap();
    let (status, body) = send(offline_router(), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_missing_token_is_server_error() {
    let request = post(BRIDGE_PATH)
        .header("x-task-push-secret", SECRET)
        .body(Body::from(VALID))
        .unwrap();
    let (status, body) = send(offline_router(), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Missing token");
}

#[tokio::test]
async fn test_dry_run_via_query() {
    let request = post(&format!("{}?dryRun=true", BRIDGE_PATH))
        .header("x-task-push-secret", SECRET)
        .body(Body::from(VALID))
        .unwrap();
    let (status, body) = send(offline_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "dryRun": true,
            "parentPayload": {"content": "T"},
            "childrenPayloadsCount": 2,
            "hint": "Remove ?dryRun=true to actually create tasks"
        })
    );
}

#[tokio::test]
async fn test_legacy_path_is_served() {
    let request = post(LEGACY_BRIDGE_PATH)
        .header(header::AUTHORIZATION, format!("Bearer {}", SECRET))
        .header("x-dry-run", "true")
        .body(Body::from(VALID))
        .unwrap();
    let (status, body) = send(offline_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dryRun"], true);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let request = post("/api/other").body(Body::from(VALID)).unwrap();
    let response = offline_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_full_creation_through_router() {
    let todoist = FakeTodoist::start().await;
    let app = router(Arc::new(todoist.bridge()));

    let request = post(BRIDGE_PATH)
        .header("x-task-push-secret", SECRET)
        .body(Body::from(VALID))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parent"]["id"], "task-1");
    assert_eq!(body["subtasks"][0]["content"], "A");
    assert_eq!(body["subtasks"][1]["content"], "B");
    assert_eq!(body["subtasks"][1]["parent_id"], "task-1");
    assert_eq!(todoist.calls().len(), 3);
}

#[tokio::test]
async fn test_external_status_passes_through_router() {
    let todoist = FakeTodoist::failing_at(1, 400, "Invalid priority").await;
    let app = router(Arc::new(todoist.bridge()));

    let request = post(BRIDGE_PATH)
        .header("x-task-push-secret", SECRET)
        .body(Body::from(VALID))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "Subtask failed", "detail": "Invalid priority", "index": 0})
    );
    // Parent and the failed first child; the second child was never sent.
    assert_eq!(todoist.calls().len(), 2);
}
