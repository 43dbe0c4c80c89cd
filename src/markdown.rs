//! Markdown rendering pipeline
//!
//! Assistant text reaches a surface only through `render_sanitized`:
//! CommonMark to HTML via pulldown-cmark, then sanitization via ammonia.
//! The order is fixed — sanitizing before rendering would let the renderer
//! reintroduce markup the sanitizer already removed.

use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};

/// Shared sanitizer with ammonia's conservative default allowlist
///
/// The defaults strip script elements, event-handler attributes, and
/// `javascript:` URLs while keeping ordinary formatting tags.
static SANITIZER: Lazy<ammonia::Builder<'static>> = Lazy::new(ammonia::Builder::default);

/// Render Markdown text to HTML (unsanitized)
pub fn render(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(text, options);

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Strip markup capable of executing code from an HTML fragment
pub fn sanitize(html: &str) -> String {
    SANITIZER.clean(html).to_string()
}

/// Render Markdown and sanitize the result, in that order
pub fn render_sanitized(text: &str) -> String {
    sanitize(&render(text))
}
