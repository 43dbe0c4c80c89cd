//! Terminal surface
//!
//! The shipped frontend for the client binary: a transcript written to
//! stdout. The in-progress assistant block is redrawn in place on every
//! update with crossterm cursor ops, so streaming looks live instead of
//! repeating the growing reply. Sanitized HTML from the widget is
//! flattened to readable text before printing; that flattening is purely a
//! display concern of this surface.

use crate::widget::Surface;
use crossterm::{
    cursor::{MoveToColumn, MoveUp},
    terminal::{Clear, ClearType},
    QueueableCommand,
};
use std::io::{self, Write};
use tracing::warn;

/// Label prefixing user entries in the transcript
const USER_LABEL: &str = "you: ";

/// Label prefixing assistant entries in the transcript
const ASSISTANT_LABEL: &str = "joi: ";

/// Surface writing a chat transcript to a terminal
pub struct TerminalSurface<W: Write> {
    out: W,
    /// Terminal lines occupied by the current assistant block
    drawn_lines: u16,
}

impl TerminalSurface<io::Stdout> {
    /// Create a surface writing to stdout
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write> TerminalSurface<W> {
    /// Create a surface writing to an arbitrary writer
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            drawn_lines: 0,
        }
    }

    /// Redraw the current assistant block, replacing what was drawn before
    fn redraw_assistant(&mut self, body: &str) -> io::Result<()> {
        if self.drawn_lines > 0 {
            self.out.queue(MoveUp(self.drawn_lines))?;
            self.out.queue(MoveToColumn(0))?;
            self.out.queue(Clear(ClearType::FromCursorDown))?;
        }

        let block = format!("{ASSISTANT_LABEL}{body}");
        let mut lines: u16 = 0;
        for line in block.lines() {
            writeln!(self.out, "{line}")?;
            lines = lines.saturating_add(1);
        }
        if lines == 0 {
            writeln!(self.out)?;
            lines = 1;
        }
        self.drawn_lines = lines;
        self.out.flush()
    }

    /// Log instead of propagating: surface calls have no error channel
    fn check(result: io::Result<()>) {
        if let Err(e) = result {
            warn!(error = %e, "Terminal write failed");
        }
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn push_user(&mut self, text: &str) {
        let result = writeln!(self.out, "{USER_LABEL}{text}").and_then(|()| self.out.flush());
        Self::check(result);
    }

    fn begin_assistant(&mut self) {
        self.drawn_lines = 0;
        Self::check(self.redraw_assistant(""));
    }

    fn replace_assistant_html(&mut self, html: &str) {
        let text = flatten_html(html);
        Self::check(self.redraw_assistant(&text));
    }

    fn replace_assistant_text(&mut self, text: &str) {
        Self::check(self.redraw_assistant(text));
    }

    fn set_controls_enabled(&mut self, _enabled: bool) {
        // The synchronous read loop cannot submit while a cycle runs, so
        // the terminal has no control to disable.
    }

    fn scroll_to_bottom(&mut self) {
        // The terminal scrolls on write.
    }

    fn focus_input(&mut self) {
        let result = write!(self.out, "> ").and_then(|()| self.out.flush());
        Self::check(result);
    }
}

/// Flatten an HTML fragment to plain text for terminal display
///
/// Tags are dropped, block-level closers and `<br>` become newlines, list
/// items get a dash marker, and the basic entities are unescaped. This is
/// a transcript approximation, not an HTML renderer.
pub fn flatten_html(html: &str) -> String {
    let mut out = String::new();
    let mut chars = html.chars();
    while let Some(c) = chars.next() {
        if c != '<' {
            // Collapse the newlines pulldown-cmark puts between block
            // elements; tag handling below already breaks lines
            if c == '\n' && (out.is_empty() || out.ends_with('\n')) {
                continue;
            }
            out.push(c);
            continue;
        }
        let mut tag = String::new();
        for t in chars.by_ref() {
            if t == '>' {
                break;
            }
            tag.push(t);
        }
        let name = tag
            .trim()
            .trim_end_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        match name.as_str() {
            "br" | "/p" | "/li" | "/ul" | "/ol" | "/pre" | "/blockquote" | "/table" | "/tr"
            | "/h1" | "/h2" | "/h3" | "/h4" | "/h5" | "/h6" => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            "li" => out.push_str("- "),
            _ => {}
        }
    }

    let unescaped = out
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&");
    unescaped.trim_end().to_string()
}
