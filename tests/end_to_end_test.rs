//! End-to-end tests: widget -> HTTP transport -> relay server -> mocked
//! upstream API
//!
//! The relay server runs on an ephemeral port with its upstream base URL
//! pointed at a mockito server, so the full client/server path is
//! exercised without touching the real API.

use joi_chat::config::UpstreamConfig;
use joi_chat::markdown;
use joi_chat::server::{router, ServerState};
use joi_chat::transport::HttpChatTransport;
use joi_chat::widget::{ChatWidget, Role, Surface, ERROR_PREFIX};

/// Minimal surface keeping only the latest assistant content
#[derive(Default)]
struct CollectingSurface {
    last_html: Option<String>,
    last_text: Option<String>,
    controls_enabled: bool,
    focused: bool,
}

impl Surface for CollectingSurface {
    fn push_user(&mut self, _text: &str) {}
    fn begin_assistant(&mut self) {}
    fn replace_assistant_html(&mut self, html: &str) {
        self.last_html = Some(html.to_string());
    }
    fn replace_assistant_text(&mut self, text: &str) {
        self.last_text = Some(text.to_string());
    }
    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
        if !enabled {
            self.focused = false;
        }
    }
    fn scroll_to_bottom(&mut self) {}
    fn focus_input(&mut self) {
        self.focused = true;
    }
}

/// Spawn the relay server on an ephemeral port, returning its chat endpoint
async fn spawn_server(api_key: Option<&str>, upstream_base_url: &str) -> String {
    let state = ServerState {
        http: reqwest::Client::new(),
        upstream: UpstreamConfig {
            api_key: api_key.map(str::to_string),
            model: "gemini-2.5-flash-lite".to_string(),
        },
        upstream_base_url: upstream_base_url.to_string(),
    };
    let app = router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port should bind");
    let addr = listener.local_addr().expect("listener has an address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server runs");
    });
    format!("http://{addr}/api/chat")
}

fn sse_event(text: &str) -> String {
    format!(
        "data: {{\"candidates\":[{{\"content\":{{\"parts\":[{{\"text\":\"{}\"}}],\"role\":\"model\"}}}}]}}\n\n",
        text
    )
}

#[tokio::test]
async fn full_reply_flows_from_upstream_to_rendered_html() {
    let mut upstream = mockito::Server::new_async().await;
    let body = format!("{}{}", sse_event("Hello "), sse_event("**world**"));
    let mock = upstream
        .mock(
            "POST",
            "/models/gemini-2.5-flash-lite:streamGenerateContent",
        )
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let endpoint = spawn_server(Some("test-key"), &upstream.url()).await;
    let transport = HttpChatTransport::new(&endpoint).expect("endpoint should parse");
    let mut widget = ChatWidget::new(CollectingSurface::default(), transport);

    widget.submit("hi joi").await;

    mock.assert_async().await;
    let assistant = widget.messages().last().expect("assistant entry exists");
    assert_eq!(assistant.role, Role::Assistant);
    assert_eq!(assistant.text, "Hello **world**");
    assert_eq!(
        widget.surface().last_html.as_deref(),
        Some(markdown::render_sanitized("Hello **world**").as_str())
    );
    assert!(widget.surface().controls_enabled);
    assert!(widget.surface().focused);
}

#[tokio::test]
async fn missing_api_key_surfaces_as_marked_error_text() {
    // No upstream call happens; the relay answers 503 before opening one
    let endpoint = spawn_server(None, "http://127.0.0.1:1").await;
    let transport = HttpChatTransport::new(&endpoint).expect("endpoint should parse");
    let mut widget = ChatWidget::new(CollectingSurface::default(), transport);

    widget.submit("hi joi").await;

    let text = widget
        .surface()
        .last_text
        .as_deref()
        .expect("error text rendered");
    assert!(text.starts_with(ERROR_PREFIX), "got: {text}");
    assert!(text.contains("GEMINI_API_KEY"), "got: {text}");
    assert!(widget.surface().last_html.is_none());
    assert!(widget.surface().controls_enabled);
    assert!(widget.surface().focused);
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let endpoint = spawn_server(None, "http://127.0.0.1:1").await;
    let health_url = endpoint.replace("/api/chat", "/api/health");

    let response = reqwest::get(&health_url).await.expect("health reachable");
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("health body is json");
    assert_eq!(body["status"], "healthy");
}
