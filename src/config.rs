//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults. Shared by the client and server binaries.

use std::env;

/// Default chat endpoint used by the client when `CHAT_ENDPOINT` is unset
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080/api/chat";

/// Default Gemini model used by the server when `GEMINI_MODEL` is unset
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Client configuration
    pub client: ClientConfig,
    /// Server configuration
    pub server: ServerConfig,
    /// Upstream model API configuration
    pub upstream: UpstreamConfig,
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL of the chat endpoint the client posts messages to
    pub endpoint: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Upstream model API configuration
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Gemini API key; the chat endpoint reports 503 when absent
    pub api_key: Option<String>,
    /// Model name to request from the upstream API
    pub model: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            client: ClientConfig {
                endpoint: env::var("CHAT_ENDPOINT")
                    .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            },
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            upstream: UpstreamConfig {
                api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
                model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
