//! Error types and error handling for the application
//!
//! `ChatError` covers the client side (one send/stream cycle), `AppError`
//! the server side. Server errors convert to plain-text HTTP responses
//! because the client contract displays failure bodies verbatim.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors that can occur during one client send/stream cycle
///
/// The two terminal variants mirror the widget's error taxonomy: a server
/// that answered with a non-success status, and a transport that failed
/// outright during send or read. Neither is retried.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The server answered with a non-success status; `body` holds the
    /// full error text read from the response
    #[error("server error {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error body, read as text
        body: String,
    },

    /// The connection failed while sending the request or reading the stream
    #[error("connection failed: {0}")]
    Connection(String),

    /// The configured chat endpoint is not a valid URL
    ///
    /// Raised at transport construction so misconfiguration fails fast
    /// instead of surfacing mid-send.
    #[error("invalid chat endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Server-side error types
///
/// Each variant converts to an HTTP response via `IntoResponse`. Bodies are
/// plain text, never JSON: the client renders them verbatim behind its
/// error marker.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request message was empty or whitespace-only
    #[error("message must not be empty")]
    EmptyMessage,

    /// Upstream model API cannot be reached (e.g., missing API key)
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream model API answered with a non-success status
    #[error("upstream error {status}: {body}")]
    UpstreamStatus {
        /// HTTP status code returned by the upstream API
        status: u16,
        /// Error body returned by the upstream API
        body: String,
    },

    /// Upstream stream failed mid-read
    #[error("upstream stream error: {0}")]
    UpstreamStream(String),

    /// Internal server error (catch-all for unexpected errors)
    #[error("internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::EmptyMessage => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UpstreamStatus { .. } => StatusCode::BAD_GATEWAY,
            AppError::UpstreamStream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
