//! Chat transport
//!
//! The HTTP seam between the widget and the chat backend. The widget only
//! sees the `ChatTransport` trait; the production implementation is
//! [`http::HttpChatTransport`], and tests substitute scripted transports.

pub mod http;

pub use http::HttpChatTransport;

use crate::error::ChatError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::Stream;
use std::pin::Pin;

/// Stream of raw response byte chunks for one reply
///
/// Chunk boundaries carry no meaning: concatenating all chunks reconstructs
/// the full UTF-8 reply. A mid-stream error terminates the reply.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ChatError>> + Send>>;

/// Transport capable of delivering one message and streaming back the reply
#[async_trait]
pub trait ChatTransport {
    /// Send one message and open the reply stream
    ///
    /// # Errors
    /// * `ChatError::Status` - the server answered with a non-success
    ///   status; the error body has already been read as text
    /// * `ChatError::Connection` - the request could not be sent
    async fn send(&self, message: &str) -> Result<ByteStream, ChatError>;
}
