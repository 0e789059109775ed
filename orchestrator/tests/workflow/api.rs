use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use storyforge_orchestrator::web::{create_router, AppState};
use storyforge_orchestrator::{
    AgentOutput, ArtifactStore, ContentCreationResult, ContentService, MarkdownStore, Specialist,
};

use crate::support::*;

fn app(stub: StubCapability) -> Router {
    create_router(AppState::new(ContentService::new(Arc::new(stub), None)))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// `data:` payloads of an SSE body, in order
fn sse_events(body: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(body)
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let response = app(StubCapability::happy())
        .oneshot(Request::get("/workflow/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["message"].is_string());
    assert!(body["workflow_id"].is_null());
    assert!(body["markdown_path"].is_null());
}

#[tokio::test]
async fn test_root() {
    let response = app(StubCapability::happy())
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["health"], "/workflow/health");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_create_returns_artifact() {
    let response = app(StubCapability::happy())
        .oneshot(post("/workflow/create", json!({"prompt": "Mars", "save_markdown": false})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let result: ContentCreationResult = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(result.is_completed());
    assert_eq!(result.generated_image.as_deref(), Some(IMAGE));
    assert_eq!(result.metadata.tool_used.len(), 4);
}

#[tokio::test]
async fn test_create_reports_phase_failure_in_body() {
    let stub = StubCapability::happy().failing(Specialist::Researcher, "search backend down");
    let response = app(stub)
        .oneshot(post("/workflow/create", json!({"prompt": "Mars"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let status = body["metadata"]["status"].as_str().unwrap();
    assert!(status.starts_with("error: "));
    assert!(status.contains("search backend down"));
    assert!(body["generated_image"].is_null());
}

#[tokio::test]
async fn test_create_rejects_empty_prompt() {
    let response = app(StubCapability::happy())
        .oneshot(post("/workflow/create", json!({"prompt": ""})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("prompt"));
}

#[tokio::test]
async fn test_create_accepts_whitespace_prompt() {
    let stub = StubCapability::happy();
    let response = app(stub)
        .oneshot(post("/workflow/create", json!({"prompt": " ", "save_markdown": false})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let result: ContentCreationResult = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(result.is_completed());
}

#[tokio::test]
async fn test_create_rejects_missing_prompt() {
    let response = app(StubCapability::happy())
        .oneshot(post("/workflow/create", json!({"save_markdown": true})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["detail"].is_string());
}

#[tokio::test]
async fn test_create_saves_markdown_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let stub = StubCapability::happy().with_output(Specialist::Artist, AgentOutput::Text("A dome at dusk".to_string()));
    let store: Arc<dyn ArtifactStore> = Arc::new(MarkdownStore::new(dir.path()));
    let app = create_router(AppState::new(ContentService::new(Arc::new(stub), Some(store))));

    let response = app
        .clone()
        .oneshot(post("/workflow/create", json!({"prompt": "Mars", "save_markdown": false})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    let response = app
        .oneshot(post("/workflow/create", json!({"prompt": "Mars"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_stream_emits_progress_then_complete() {
    let response = app(StubCapability::happy())
        .oneshot(post("/workflow/create-stream", json!({"prompt": "Mars", "save_markdown": false})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let events = sse_events(&body_bytes(response).await);
    assert_eq!(events.len(), 9);
    assert_eq!(
        events[0],
        json!({"type": "tool_update", "tool": "research_tool", "status": "started"})
    );
    assert!(events[..8].iter().all(|e| e["type"] == "tool_update"));

    let last = &events[8];
    assert_eq!(last["type"], "complete");
    assert_eq!(last["result"]["metadata"]["status"], "completed");
    assert_eq!(last["result"]["generated_story"], STORY);
}

#[tokio::test]
async fn test_stream_emits_error_event() {
    let stub = StubCapability::happy().failing(Specialist::Artist, "content policy");
    let response = app(stub)
        .oneshot(post("/workflow/create-stream", json!({"prompt": "Mars"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let events = sse_events(&body_bytes(response).await);

    let last = events.last().unwrap();
    assert_eq!(last["type"], "error");
    assert!(last["message"].as_str().unwrap().contains("content policy"));
    assert_eq!(events.iter().filter(|e| e["type"] == "complete").count(), 0);
}

#[tokio::test]
async fn test_stream_rejects_empty_prompt() {
    let response = app(StubCapability::happy())
        .oneshot(post("/workflow/create-stream", json!({"prompt": ""})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
