//! HTTP chat transport
//!
//! reqwest-based implementation of [`ChatTransport`]: one JSON POST per
//! message, reply consumed as a raw byte stream. No retry, no widget-level
//! timeout; the transport relies on reqwest's own limits.

use crate::error::ChatError;
use crate::transport::{ByteStream, ChatTransport};
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Serialize;
use tracing::{debug, warn};

/// Request body for the chat endpoint
#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Production transport posting to a fixed chat endpoint
pub struct HttpChatTransport {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl HttpChatTransport {
    /// Create a transport for the given endpoint URL
    ///
    /// # Errors
    /// * `ChatError::InvalidEndpoint` - the URL does not parse; validation
    ///   happens here so a bad configuration fails at startup
    pub fn new(endpoint: &str) -> Result<Self, ChatError> {
        let endpoint = reqwest::Url::parse(endpoint)
            .map_err(|e| ChatError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    /// The endpoint this transport posts to
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, message: &str) -> Result<ByteStream, ChatError> {
        debug!(
            endpoint = %self.endpoint,
            message_len = message.len(),
            "Sending chat message"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|e| ChatError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            warn!(
                status = status.as_u16(),
                body = %body,
                "Chat endpoint returned error status"
            );
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let stream = response
            .bytes_stream()
            .map(|item| item.map_err(|e| ChatError::Connection(e.to_string())));
        Ok(Box::pin(stream))
    }
}
