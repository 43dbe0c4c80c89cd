//! Chat relay server
//!
//! Axum router exposing the chat endpoint the widget talks to:
//! `POST /api/chat` relays the streamed Gemini reply as a chunked
//! plain-text body, `GET /api/health` reports liveness.

pub mod chat;
pub mod upstream;

use crate::config::UpstreamConfig;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Shared state for request handlers
#[derive(Clone)]
pub struct ServerState {
    /// Shared HTTP client (connection pooling)
    pub http: reqwest::Client,
    /// Upstream model API configuration
    pub upstream: UpstreamConfig,
    /// Upstream API base URL; overridable for tests
    pub upstream_base_url: String,
}

impl ServerState {
    /// Create state with the production upstream base URL
    pub fn new(upstream: UpstreamConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            upstream,
            upstream_base_url: upstream::GEMINI_API_BASE_URL.to_string(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

/// Build the application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/chat", post(chat::chat))
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive()) // Allow CORS for development
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
