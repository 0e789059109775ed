//! HTTP server for the content workflow API
//!
//! `POST /workflow/create` runs a workflow and returns the artifact,
//! `POST /workflow/create-stream` streams progress as server-sent events.

pub mod api;
pub mod state;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Start the web server
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("Starting web server on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let workflow_routes = Router::new()
        .route("/create", post(api::create_content))
        .route("/create-stream", post(api::create_content_stream))
        .route("/health", get(api::health_check));

    Router::new()
        .route("/", get(api::root))
        .nest("/workflow", workflow_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
