//! Gemini streaming API client
//!
//! Opens one `streamGenerateContent` request per chat message and yields
//! the reply's text parts as they arrive. The SSE framing used by the
//! upstream API stays inside this module; callers see plain text chunks.

use crate::decode::StreamDecoder;
use crate::error::AppError;
use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Production Gemini API base URL
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// System prompt establishing the JOI persona
pub const SYSTEM_PROMPT: &str = "You are JOI, an empathetic emotional-support AI inspired by the character from Blade Runner 2049.\nYou greet the user with: JOI - EVERYTHING YOU WANT TO SEE, EVERYTHING YOU WANT TO HEAR\n(Adapt responses to comfort the user; be warm, empathetic, and encouraging.)\n";

/// Request structure for the Gemini API
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    /// Conversation contents (here: the single user message)
    contents: Vec<RequestContent>,
    /// System prompt applied to the whole exchange
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<RequestContent>,
}

/// Content structure for requests
#[derive(Serialize, Debug)]
struct RequestContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<RequestPart>,
}

/// A single part for requests (typically text)
#[derive(Serialize, Debug)]
struct RequestPart {
    text: String,
}

/// One streamed response event, as carried in an SSE `data:` line
#[derive(Deserialize, Debug)]
struct StreamEvent {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// A single candidate response from the model
#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

/// Content structure containing parts of the response
#[derive(Deserialize, Debug)]
struct Content {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

/// A single part of content (typically text)
#[derive(Deserialize, Debug)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Text carried by one stream event, concatenated across parts
fn event_text(event: &StreamEvent) -> String {
    let mut text = String::new();
    for candidate in &event.candidates {
        if let Some(content) = &candidate.content {
            for part in &content.parts {
                if let Some(t) = &part.text {
                    text.push_str(t);
                }
            }
        }
    }
    text
}

/// Open a streaming generation request and yield its text chunks
///
/// # Errors
/// * `AppError::UpstreamUnavailable` - the request could not be sent
/// * `AppError::UpstreamStatus` - the API answered with a non-success
///   status; the error body has been read as text
///
/// Errors after the stream opened surface as `AppError::UpstreamStream`
/// items inside the returned stream.
pub async fn stream_reply(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    message: &str,
) -> Result<impl Stream<Item = Result<String, AppError>>, AppError> {
    let url = format!(
        "{}/models/{}:streamGenerateContent?alt=sse&key={}",
        base_url, model, api_key
    );

    let request_body = GenerateRequest {
        contents: vec![RequestContent {
            role: Some("user".to_string()),
            parts: vec![RequestPart {
                text: message.to_string(),
            }],
        }],
        system_instruction: Some(RequestContent {
            role: None,
            parts: vec![RequestPart {
                text: SYSTEM_PROMPT.to_string(),
            }],
        }),
    };

    debug!(
        model = %model,
        message_len = message.len(),
        "Opening upstream stream"
    );

    let response = client
        .post(&url)
        .json(&request_body)
        .send()
        .await
        .map_err(|e| AppError::UpstreamUnavailable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_string());
        return Err(AppError::UpstreamStatus {
            status: status.as_u16(),
            body,
        });
    }

    Ok(try_stream! {
        let mut bytes = response.bytes_stream();
        // Incremental decode: a read can split a multi-byte character
        let mut decoder = StreamDecoder::new();
        let mut buffer = String::new();
        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(|e| AppError::UpstreamStream(e.to_string()))?;
            buffer.push_str(&decoder.push(&chunk));

            while let Some(line_end) = buffer.find('\n') {
                let line = buffer[..line_end].trim().to_string();
                buffer.drain(..=line_end);

                if let Some(data) = line.strip_prefix("data:") {
                    let data = data.trim();
                    if data.is_empty() || data == "[DONE]" {
                        continue;
                    }
                    let event: StreamEvent = serde_json::from_str(data)
                        .map_err(|e| AppError::UpstreamStream(format!("bad event: {e}")))?;
                    let text = event_text(&event);
                    if !text.is_empty() {
                        yield text;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::io::Write;

    fn sse_event(text: &str) -> String {
        format!(
            "data: {{\"candidates\":[{{\"content\":{{\"parts\":[{{\"text\":\"{}\"}}],\"role\":\"model\"}}}}]}}\n\n",
            text
        )
    }

    #[tokio::test]
    async fn relays_text_parts_from_sse_events() {
        let mut server = mockito::Server::new_async().await;
        let body = format!("{}{}", sse_event("Hello "), sse_event("there"));
        let mock = server
            .mock(
                "POST",
                "/models/gemini-2.5-flash-lite:streamGenerateContent",
            )
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("alt".into(), "sse".into()),
                mockito::Matcher::UrlEncoded("key".into(), "test-key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let stream = stream_reply(
            &client,
            &server.url(),
            "test-key",
            "gemini-2.5-flash-lite",
            "hi",
        )
        .await
        .expect("stream should open");

        let chunks: Vec<String> = stream
            .map(|item| item.expect("chunk should be ok"))
            .collect()
            .await;

        mock.assert_async().await;
        assert_eq!(chunks, vec!["Hello ".to_string(), "there".to_string()]);
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                "/models/gemini-2.5-flash-lite:streamGenerateContent",
            )
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .with_body("quota exceeded")
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let result = stream_reply(
            &client,
            &server.url(),
            "test-key",
            "gemini-2.5-flash-lite",
            "hi",
        )
        .await;

        mock.assert_async().await;
        match result {
            Err(AppError::UpstreamStatus { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exceeded");
            }
            Err(other) => panic!("expected upstream status error, got {other}"),
            Ok(_) => panic!("expected upstream status error, got a stream"),
        }
    }

    #[tokio::test]
    async fn events_split_across_chunks_still_parse() {
        let mut server = mockito::Server::new_async().await;
        let event = sse_event("split across reads");
        let (front, back) = event.split_at(20);
        let front = front.as_bytes().to_vec();
        let back = back.as_bytes().to_vec();
        let mock = server
            .mock(
                "POST",
                "/models/gemini-2.5-flash-lite:streamGenerateContent",
            )
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_chunked_body(move |w| {
                w.write_all(&front)?;
                w.flush()?;
                w.write_all(&back)
            })
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let stream = stream_reply(
            &client,
            &server.url(),
            "test-key",
            "gemini-2.5-flash-lite",
            "hi",
        )
        .await
        .expect("stream should open");

        let chunks: Vec<String> = stream
            .map(|item| item.expect("chunk should be ok"))
            .collect()
            .await;

        mock.assert_async().await;
        assert_eq!(chunks, vec!["split across reads".to_string()]);
    }

    #[test]
    fn event_text_concatenates_parts() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}]}}]}"#,
        )
        .expect("event should parse");
        assert_eq!(event_text(&event), "ab");
    }

    #[test]
    fn event_without_content_yields_empty_text() {
        let event: StreamEvent =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)
                .expect("event should parse");
        assert_eq!(event_text(&event), "");
    }
}
