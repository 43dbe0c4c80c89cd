//! Chat endpoint
//!
//! `POST /api/chat`: body `{"message": "<text>"}`, reply a chunked
//! `text/plain` stream with no framing — concatenating the chunks
//! reconstructs the full reply. Failures before the stream opens are
//! reported as non-success statuses with plain-text bodies, which the
//! client displays verbatim; a failure mid-stream terminates the body.

use crate::error::AppError;
use crate::server::{upstream, ServerState};
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use futures_util::StreamExt;
use serde::Deserialize;
use tracing::{error, info};

/// Request body for the chat endpoint
#[derive(Deserialize)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
}

/// Handle one chat message, streaming the model's reply
pub async fn chat(
    State(state): State<ServerState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::EmptyMessage);
    }

    let api_key = state
        .upstream
        .api_key
        .as_deref()
        .ok_or_else(|| AppError::UpstreamUnavailable("GEMINI_API_KEY is not set".to_string()))?;

    info!(
        message_len = request.message.len(),
        model = %state.upstream.model,
        "Chat request received"
    );

    let reply = upstream::stream_reply(
        &state.http,
        &state.upstream_base_url,
        api_key,
        &state.upstream.model,
        &request.message,
    )
    .await?;

    // Relay text chunks as-is; log mid-stream errors before they cut the body
    let body_stream = reply.map(|item| {
        if let Err(e) = &item {
            error!(error = %e, "Upstream stream failed mid-reply");
        }
        item
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from_stream(body_stream))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}
