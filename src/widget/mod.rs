//! Chat widget engine
//!
//! Binds a surface and a transport, serializes one outgoing message, and
//! progressively renders the streamed reply into the surface. One cycle:
//! Idle -> Sending -> Streaming -> Idle, with a single terminal transition
//! back to Idle on completion, error, or exception. There is no cancel
//! path and no retry; at most one cycle is in flight at a time.

pub mod surface;
pub mod terminal;

pub use surface::Surface;
pub use terminal::TerminalSurface;

use crate::decode::StreamDecoder;
use crate::error::ChatError;
use crate::markdown;
use crate::transport::ChatTransport;
use futures_util::StreamExt;
use tracing::{debug, warn};

/// Prefix shown before a server-reported error body
pub const ERROR_PREFIX: &str = "[Error] ";

/// Prefix shown before a transport-level failure
pub const CONNECT_ERROR_PREFIX: &str = "[Connection error] ";

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Message typed by the user
    User,
    /// Message streamed back by the assistant
    Assistant,
}

/// One transcript entry
///
/// User entries are immutable once created; the latest assistant entry
/// accumulates text until its stream ends.
#[derive(Debug, Clone)]
pub struct Message {
    /// Who produced this entry
    pub role: Role,
    /// The entry's source text (Markdown for assistant entries)
    pub text: String,
}

/// The chat widget: one surface, one transport, one in-flight cycle at most
pub struct ChatWidget<S, T> {
    surface: S,
    transport: T,
    messages: Vec<Message>,
    in_flight: bool,
}

impl<S: Surface, T: ChatTransport> ChatWidget<S, T> {
    /// Create a widget bound to a surface and a transport
    pub fn new(surface: S, transport: T) -> Self {
        Self {
            surface,
            transport,
            messages: Vec::new(),
            in_flight: false,
        }
    }

    /// The transcript accumulated so far
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether a send cycle is currently running
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Borrow the surface (used by frontends and tests to inspect it)
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutably borrow the surface (frontends re-prompt through it)
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Submit one message and run its full send/stream cycle
    ///
    /// Whitespace-only input is silently ignored, as is a submission while
    /// a cycle is already in flight (the controls are disabled then; this
    /// guard covers input paths that bypass them). Whatever the cycle's
    /// outcome, the controls end up re-enabled and the input focused.
    pub async fn submit(&mut self, input: &str) {
        let text = input.trim();
        if text.is_empty() {
            return;
        }
        if self.in_flight {
            debug!("Submission ignored: a cycle is already in flight");
            return;
        }
        self.in_flight = true;

        self.messages.push(Message {
            role: Role::User,
            text: text.to_string(),
        });
        self.surface.push_user(text);
        self.surface.set_controls_enabled(false);
        self.surface.scroll_to_bottom();

        // Empty assistant entry, filled as the stream arrives
        self.messages.push(Message {
            role: Role::Assistant,
            text: String::new(),
        });
        self.surface.begin_assistant();

        self.run_cycle(text).await;

        // Unconditional cleanup: the UI must never stay disabled
        self.surface.set_controls_enabled(true);
        self.surface.focus_input();
        self.in_flight = false;
    }

    /// One send/stream cycle; all failures end in the assistant entry
    async fn run_cycle(&mut self, text: &str) {
        let mut stream = match self.transport.send(text).await {
            Ok(stream) => stream,
            Err(err) => {
                self.fail(&err);
                return;
            }
        };

        let mut decoder = StreamDecoder::new();
        let mut chunks = 0usize;
        while let Some(next) = stream.next().await {
            let bytes = match next {
                Ok(bytes) => bytes,
                Err(err) => {
                    self.fail(&err);
                    return;
                }
            };
            chunks += 1;
            let piece = decoder.push(&bytes);
            if !piece.is_empty() {
                self.append_assistant(&piece);
            }
        }

        // A dangling partial sequence at stream end decodes to U+FFFD
        let tail = decoder.finish();
        if !tail.is_empty() {
            self.append_assistant(&tail);
        }

        debug!(
            chunks = chunks,
            reply_len = self.assistant_text().len(),
            "Stream completed"
        );
    }

    /// Append decoded text to the accumulator and re-render it in full
    ///
    /// The whole accumulated text goes back through the Markdown pipeline
    /// on every chunk: constructs like code fences only become well-formed
    /// once enough of the text has arrived, so rendered HTML cannot be
    /// appended incrementally.
    fn append_assistant(&mut self, piece: &str) {
        let accumulated = match self.messages.last_mut() {
            Some(entry) if entry.role == Role::Assistant => {
                entry.text.push_str(piece);
                entry.text.clone()
            }
            _ => return,
        };
        let html = markdown::render_sanitized(&accumulated);
        self.surface.replace_assistant_html(&html);
        self.surface.scroll_to_bottom();
    }

    /// Surface a terminal failure for this cycle as literal marked text
    fn fail(&mut self, err: &ChatError) {
        warn!(error = %err, "Send cycle failed");
        let text = match err {
            ChatError::Status { body, .. } => format!("{ERROR_PREFIX}{body}"),
            ChatError::Connection(detail) => format!("{CONNECT_ERROR_PREFIX}{detail}"),
            ChatError::InvalidEndpoint(detail) => format!("{CONNECT_ERROR_PREFIX}{detail}"),
        };
        if let Some(entry) = self.messages.last_mut() {
            if entry.role == Role::Assistant {
                entry.text = text.clone();
            }
        }
        self.surface.replace_assistant_text(&text);
        self.surface.scroll_to_bottom();
    }

    /// Text of the current assistant entry, if any
    fn assistant_text(&self) -> &str {
        match self.messages.last() {
            Some(entry) if entry.role == Role::Assistant => &entry.text,
            _ => "",
        }
    }
}
