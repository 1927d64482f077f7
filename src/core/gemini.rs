//! Gemini implementation of [`StreamingClient`].
//!
//! Replies are read from the server-sent-event variant of
//! `streamGenerateContent`. The client keeps the running conversation so
//! follow-up prompts carry context, the way a chat object of the official
//! SDK does.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use memchr::memchr;
use tracing::{debug, warn};

use crate::api::{Content, GenerateContentRequest, GenerateContentResponse};
use crate::core::chat_stream::{FragmentStream, StreamError, StreamingClient};
use crate::core::model::ModelType;
use crate::utils::url::construct_api_url;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug)]
struct ChatState {
    model: ModelType,
    history: Vec<Content>,
    /// Bumped on every reset so replies from an older chat are not recorded.
    generation: u64,
}

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    state: Arc<Mutex<ChatState>>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            state: Arc::new(Mutex::new(ChatState {
                model: ModelType::default(),
                history: Vec::new(),
                generation: 0,
            })),
        }
    }

    fn stream_url(&self, model: ModelType) -> String {
        construct_api_url(
            &self.base_url,
            &format!("models/{}:streamGenerateContent?alt=sse", model.api_id()),
        )
    }

    #[cfg(test)]
    fn history_len(&self) -> usize {
        lock_state(&self.state).history.len()
    }
}

fn lock_state(state: &Mutex<ChatState>) -> MutexGuard<'_, ChatState> {
    state
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn reset_chat(state: &mut ChatState, model: ModelType) {
    state.model = model;
    state.history.clear();
    state.generation += 1;
}

#[async_trait]
impl StreamingClient for GeminiClient {
    fn init_chat(&self, model: ModelType) {
        debug!(model = model.api_id(), "initializing chat");
        reset_chat(&mut lock_state(&self.state), model);
    }

    async fn send_message_stream(
        &self,
        text: &str,
        model: ModelType,
    ) -> Result<FragmentStream, StreamError> {
        let api_key = self.api_key.as_deref().ok_or(StreamError::MissingApiKey)?;

        let (contents, generation) = {
            let mut state = lock_state(&self.state);
            if state.model != model {
                reset_chat(&mut state, model);
            }
            let mut contents = state.history.clone();
            contents.push(Content::user(text));
            (contents, state.generation)
        };

        debug!(
            model = model.api_id(),
            turns = contents.len(),
            "sending streaming request"
        );
        let response = self
            .http
            .post(self.stream_url(model))
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(&GenerateContentRequest { contents })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(StreamError::Api {
                status: Some(status),
                message: summarize_api_error(&body),
            });
        }

        let recorder = TurnRecorder {
            state: Arc::clone(&self.state),
            generation,
            prompt: text.to_string(),
            reply: String::new(),
        };
        Ok(fragment_stream(Box::pin(response.bytes_stream()), recorder))
    }
}

/// Appends a finished exchange to the chat history.
struct TurnRecorder {
    state: Arc<Mutex<ChatState>>,
    generation: u64,
    prompt: String,
    reply: String,
}

impl TurnRecorder {
    fn commit(self) {
        let mut state = lock_state(&self.state);
        if state.generation != self.generation {
            debug!("chat was reset while streaming; reply not recorded");
            return;
        }
        state.history.push(Content::user(self.prompt));
        state.history.push(Content::model(self.reply));
    }
}

struct SseReader<S> {
    bytes: S,
    buffer: Vec<u8>,
    queued: VecDeque<Result<String, StreamError>>,
    exhausted: bool,
    failed: bool,
    recorder: Option<TurnRecorder>,
}

impl<S> SseReader<S> {
    fn drain_complete_lines(&mut self) {
        while let Some(newline_pos) = memchr(b'\n', &self.buffer) {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            self.queue_line(&line[..newline_pos]);
        }
    }

    fn drain_tail(&mut self) {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.queue_line(&line);
        }
    }

    fn queue_line(&mut self, raw: &[u8]) {
        match std::str::from_utf8(raw) {
            Ok(line) => {
                if let Some(item) = parse_sse_line(line.trim()) {
                    self.queued.push_back(item);
                }
            }
            Err(e) => warn!("Invalid UTF-8 in stream: {e}"),
        }
    }
}

fn fragment_stream<S, B, E>(bytes: S, recorder: TurnRecorder) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Send + 'static,
    StreamError: From<E>,
{
    let reader = SseReader {
        bytes,
        buffer: Vec::new(),
        queued: VecDeque::new(),
        exhausted: false,
        failed: false,
        recorder: Some(recorder),
    };

    Box::pin(futures_util::stream::unfold(reader, |mut reader| async move {
        loop {
            if reader.failed {
                return None;
            }

            if let Some(item) = reader.queued.pop_front() {
                match &item {
                    Ok(fragment) => {
                        if let Some(recorder) = reader.recorder.as_mut() {
                            recorder.reply.push_str(fragment);
                        }
                    }
                    Err(_) => {
                        reader.failed = true;
                        reader.queued.clear();
                    }
                }
                return Some((item, reader));
            }

            if reader.exhausted {
                if let Some(recorder) = reader.recorder.take() {
                    recorder.commit();
                }
                return None;
            }

            match reader.bytes.next().await {
                Some(Ok(chunk)) => {
                    reader.buffer.extend_from_slice(chunk.as_ref());
                    reader.drain_complete_lines();
                }
                Some(Err(e)) => reader.queued.push_back(Err(StreamError::from(e))),
                None => {
                    reader.drain_tail();
                    reader.exhausted = true;
                }
            }
        }
    }))
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

/// Turn one SSE line into a stream item. Lines that carry no visible text
/// (comments, blank keep-alives, metadata-only events) yield `None`.
fn parse_sse_line(line: &str) -> Option<Result<String, StreamError>> {
    let payload = extract_data_payload(line)?;
    if payload.is_empty() {
        return None;
    }

    let value: serde_json::Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(_) => return Some(Err(StreamError::Decode(payload.to_string()))),
    };

    if value.get("error").is_some() {
        return Some(Err(StreamError::Api {
            status: value
                .pointer("/error/code")
                .and_then(|code| code.as_u64())
                .and_then(|code| u16::try_from(code).ok()),
            message: summarize_error_value(&value).unwrap_or_else(|| payload.to_string()),
        }));
    }

    match serde_json::from_value::<GenerateContentResponse>(value) {
        Ok(response) => {
            let text = response.text();
            if text.is_empty() {
                None
            } else {
                Some(Ok(text))
            }
        }
        Err(e) => Some(Err(StreamError::Decode(e.to_string()))),
    }
}

fn summarize_error_value(value: &serde_json::Value) -> Option<String> {
    let value = match value {
        serde_json::Value::Array(items) => items.first()?,
        other => other,
    };

    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        })?;

    let collapsed = summary.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// One-line description of an error response body.
fn summarize_api_error(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| summarize_error_value(&value))
        .unwrap_or_else(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder_for(client: &GeminiClient, prompt: &str) -> TurnRecorder {
        TurnRecorder {
            state: Arc::clone(&client.state),
            generation: lock_state(&client.state).generation,
            prompt: prompt.to_string(),
            reply: String::new(),
        }
    }

    fn chunks(parts: &[&str]) -> impl Stream<Item = Result<Vec<u8>, StreamError>> + Unpin {
        let owned: Vec<Result<Vec<u8>, StreamError>> =
            parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        futures_util::stream::iter(owned)
    }

    async fn collect(stream: FragmentStream) -> Vec<Result<String, StreamError>> {
        stream.collect().await
    }

    #[test]
    fn parse_sse_line_handles_spacing_variants() {
        let spaced = r#"data: {"candidates":[{"content":{"parts":[{"text":"Hello"}]}}]}"#;
        let tight = r#"data:{"candidates":[{"content":{"parts":[{"text":"World"}]}}]}"#;

        assert_eq!(parse_sse_line(spaced).and_then(Result::ok).as_deref(), Some("Hello"));
        assert_eq!(parse_sse_line(tight).and_then(Result::ok).as_deref(), Some("World"));
    }

    #[test]
    fn parse_sse_line_skips_non_text_events() {
        assert!(parse_sse_line("").is_none());
        assert!(parse_sse_line(": keep-alive").is_none());
        assert!(parse_sse_line("event: message").is_none());
        assert!(parse_sse_line(r#"data: {"usageMetadata":{"totalTokenCount":4}}"#).is_none());
    }

    #[test]
    fn parse_sse_line_routes_error_payloads() {
        let line = r#"data: {"error":{"code":429,"message":"Resource   has been exhausted"}}"#;
        match parse_sse_line(line) {
            Some(Err(StreamError::Api { status, message })) => {
                assert_eq!(status, Some(429));
                assert_eq!(message, "Resource has been exhausted");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn parse_sse_line_rejects_garbage() {
        assert!(matches!(
            parse_sse_line("data: not json"),
            Some(Err(StreamError::Decode(_)))
        ));
        // Gemini ends a stream by closing it; there is no sentinel event.
        assert!(matches!(
            parse_sse_line("data: [DONE]"),
            Some(Err(StreamError::Decode(_)))
        ));
    }

    #[test]
    fn summarize_api_error_prefers_nested_message() {
        let body = r#"[{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}]"#;
        assert_eq!(summarize_api_error(body), "API key not valid.");
        assert_eq!(summarize_api_error("  upstream down \n"), "upstream down");
        assert_eq!(summarize_api_error(""), "<empty>");
    }

    #[test]
    fn stream_url_targets_sse_endpoint() {
        let client = GeminiClient::new(Some("key".into()), Some("https://example.test/v1beta/".into()));
        assert_eq!(
            client.stream_url(ModelType::Pro),
            "https://example.test/v1beta/models/gemini-3-pro-preview:streamGenerateContent?alt=sse"
        );
    }

    #[tokio::test]
    async fn fragments_survive_lines_split_across_chunks() {
        let client = GeminiClient::new(Some("key".into()), None);
        let bytes = chunks(&[
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"te",
            "xt\":\"Hel\"}]}}]}\r\n\r\ndata: {\"candidates\":[{\"content\":",
            "{\"parts\":[{\"text\":\"lo\"}]}}]}",
        ]);

        let items = collect(fragment_stream(bytes, recorder_for(&client, "Hi"))).await;
        let texts: Vec<String> = items.into_iter().map(|item| item.expect("fragment")).collect();
        assert_eq!(texts, vec!["Hel".to_string(), "lo".to_string()]);

        let state = lock_state(&client.state);
        assert_eq!(state.history, vec![Content::user("Hi"), Content::model("Hello")]);
    }

    #[tokio::test]
    async fn failed_stream_stops_and_records_nothing() {
        let client = GeminiClient::new(Some("key".into()), None);
        let bytes = chunks(&[
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hel\"}]}}]}\n",
            "data: {\"error\":{\"message\":\"internal\"}}\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"lo\"}]}}]}\n",
        ]);

        let items = collect(fragment_stream(bytes, recorder_for(&client, "Hi"))).await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
        assert_eq!(client.history_len(), 0);
    }

    #[tokio::test]
    async fn reset_during_stream_discards_reply() {
        let client = GeminiClient::new(Some("key".into()), None);
        let recorder = recorder_for(&client, "Hi");
        client.init_chat(ModelType::Fast);

        let bytes = chunks(&["data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hey\"}]}}]}\n"]);
        let items = collect(fragment_stream(bytes, recorder)).await;
        assert_eq!(items.len(), 1);
        assert_eq!(client.history_len(), 0);
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let client = GeminiClient::new(None, None);
        let result = client.send_message_stream("Hi", ModelType::Fast).await;
        assert!(matches!(result, Err(StreamError::MissingApiKey)));
    }
}
