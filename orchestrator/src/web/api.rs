//! REST API handlers

use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use crate::streaming::ProgressEvent;
use crate::workflow::ContentCreationResult;

/// Body of both create endpoints
#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    pub prompt: String,
    #[serde(default)]
    pub save_markdown: Option<bool>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Error returned from a handler as `{detail}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn unprocessable(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: detail.into(),
        }
    }

    fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { detail: self.detail })).into_response()
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub workflow_id: Option<String>,
    pub markdown_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub health: String,
}

fn validate(
    state: &AppState,
    payload: Result<Json<CreateContentRequest>, JsonRejection>,
) -> Result<(String, bool), ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::unprocessable(rejection.body_text()))?;

    if request.prompt.is_empty() {
        return Err(ApiError::unprocessable("prompt must not be empty"));
    }

    let save_markdown = request.save_markdown.unwrap_or(state.save_markdown);
    Ok((request.prompt, save_markdown))
}

/// Run a workflow to completion and return the artifact
///
/// Phase failures come back as a 200 with an `error: ...` status; only a
/// crashed workflow task is a 500.
pub async fn create_content(
    State(state): State<AppState>,
    payload: Result<Json<CreateContentRequest>, JsonRejection>,
) -> Result<Json<ContentCreationResult>, ApiError> {
    let (prompt, save_markdown) = validate(&state, payload)?;
    tracing::debug!(prompt = %prompt, save_markdown, "Create content request");

    let service = state.service.clone();
    let result = tokio::spawn(async move { service.create_content(&prompt, save_markdown).await })
        .await
        .map_err(|e| {
            tracing::error!("Workflow task aborted: {}", e);
            ApiError::internal(e.to_string())
        })?;

    Ok(Json(result))
}

/// Run a workflow and stream progress as server-sent events
pub async fn create_content_stream(
    State(state): State<AppState>,
    payload: Result<Json<CreateContentRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let (prompt, save_markdown) = validate(&state, payload)?;
    tracing::debug!(prompt = %prompt, save_markdown, "Create content stream request");

    let events = state
        .service
        .create_content_stream(prompt, save_markdown)
        .map(|event| Ok::<_, Infallible>(Event::default().data(event_json(&event))));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn event_json(event: &ProgressEvent) -> String {
    serde_json::to_string(event).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize progress event: {}", e);
        serde_json::json!({
            "type": "error",
            "message": format!("Failed to serialize result: {}", e),
        })
        .to_string()
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Content creation API is running".to_string(),
        workflow_id: None,
        markdown_path: None,
    })
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Content Creation API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        health: "/workflow/health".to_string(),
    })
}
