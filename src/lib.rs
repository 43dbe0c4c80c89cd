//! JOI Chat Library
//!
//! A streaming chat client and its companion relay server. The client side
//! is a reusable widget engine: it takes one user message, posts it to a
//! chat endpoint, and progressively renders the streamed reply as sanitized
//! Markdown. The server side exposes `POST /api/chat` and relays text
//! chunks from the Gemini streaming API.
//!
//! The main binaries are in `src/main.rs` (client) and
//! `src/bin/joi_server.rs` (server).

pub mod config;
pub mod decode;
pub mod error;
pub mod markdown;
pub mod server;
pub mod transport;
pub mod widget;
