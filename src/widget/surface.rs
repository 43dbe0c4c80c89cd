//! Surface trait
//!
//! The page seam: one method per mutation the widget performs on its host
//! UI. The widget never touches a UI handle directly, so any frontend (the
//! terminal transcript, a recording mock in tests) can host it. Because the
//! three required handles are constructor inputs of a concrete surface, a
//! widget cannot be built against missing UI elements; wiring problems fail
//! at construction, not mid-send.

/// Host-UI operations the widget performs
///
/// Calls arrive from a single streaming cycle at a time, strictly ordered;
/// implementations never see overlapping updates.
pub trait Surface {
    /// Append a user entry rendered as literal text (never as Markdown)
    fn push_user(&mut self, text: &str);

    /// Allocate an empty assistant entry as the render target for the
    /// forthcoming stream
    fn begin_assistant(&mut self);

    /// Replace the current assistant entry's content with sanitized HTML
    ///
    /// Wholesale replacement, not an append: the widget re-renders the
    /// entire accumulated text on every chunk.
    fn replace_assistant_html(&mut self, html: &str);

    /// Replace the current assistant entry's content with literal text
    ///
    /// Used for error markers; the text must not be interpreted as markup.
    fn replace_assistant_text(&mut self, text: &str);

    /// Enable or disable the input field and send control
    fn set_controls_enabled(&mut self, enabled: bool);

    /// Force the message list's scroll position to the bottom
    fn scroll_to_bottom(&mut self);

    /// Restore focus to the input field
    fn focus_input(&mut self);
}
