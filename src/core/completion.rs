//! Client for the remote chat completion service.
//!
//! One request per call. There is no streaming, no retry, and no backoff:
//! every failure collapses into [`CompletionError`] and the caller decides
//! what to show.

use std::error::Error as StdError;
use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use crate::api::{ChatCompletionResponse, ChatMessage, ChatRequest};
use crate::core::config::CompletionConfig;
use crate::core::reasoning::split_reasoning;
use crate::utils::auth::add_auth_headers;
use crate::utils::url::construct_api_url;

/// Parsed reply from the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub answer: String,
    /// Text from `<think>` regions; empty when the model emitted none.
    pub reasoning: String,
    /// Wall-clock duration of the whole request.
    pub reasoning_elapsed_ms: u64,
}

impl Completion {
    pub fn from_raw(raw: &str, elapsed: Duration) -> Self {
        let parsed = split_reasoning(raw);
        Self {
            answer: parsed.answer,
            reasoning: parsed.reasoning,
            reasoning_elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// The completion request failed. Transport, status, and decode problems
/// all land here; `detail` says which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionError {
    detail: String,
}

impl CompletionError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Completion failed: {}", self.detail)
    }
}

impl StdError for CompletionError {}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, CompletionError>;
}

pub struct HttpCompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl HttpCompletionClient {
    pub fn new(config: &CompletionConfig, api_key: impl Into<String>) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| CompletionError::new(format!("could not build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request_raw(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        let url = construct_api_url(&self.base_url, "chat/completions");
        let http_request = self
            .client
            .post(url)
            .header("Content-Type", "application/json");
        let response = add_auth_headers(http_request, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| CompletionError::new(format!("request error: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(CompletionError::new(format!(
                "HTTP {status}: {}",
                summarize_error_body(&body)
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|err| CompletionError::new(format!("could not read response: {err}")))?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|err| CompletionError::new(format!("malformed response: {err}")))?;
        Ok(parsed.first_content().to_string())
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, CompletionError> {
        debug!(model = %self.model, turns = messages.len(), "sending completion request");
        let started = Instant::now();
        let raw = self.request_raw(messages).await;
        let elapsed = started.elapsed();
        match raw {
            Ok(raw) => {
                debug!(elapsed_ms = elapsed.as_millis() as u64, "completion received");
                Ok(Completion::from_raw(&raw, elapsed))
            }
            Err(err) => {
                debug!(error = %err, "completion request failed");
                Err(err)
            }
        }
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
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
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// One-line description of an error response body.
fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json).filter(|s| !s.is_empty()) {
            return summary;
        }
    }

    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    type CapturedRequest = (String, Vec<(String, String)>, Vec<u8>);

    async fn read_http_request(
        stream: &mut tokio::net::TcpStream,
    ) -> Result<CapturedRequest, String> {
        let mut buffer = Vec::new();
        let mut header_end = None;
        while header_end.is_none() {
            let mut chunk = [0_u8; 1024];
            let read = stream.read(&mut chunk).await.map_err(|e| e.to_string())?;
            if read == 0 {
                return Err("Unexpected EOF while reading HTTP headers".to_string());
            }
            buffer.extend_from_slice(&chunk[..read]);
            header_end = buffer
                .windows(4)
                .position(|window| window == b"\r\n\r\n")
                .map(|index| index + 4);
        }

        let header_end = header_end.expect("header end should exist");
        let header_text =
            std::str::from_utf8(&buffer[..header_end]).map_err(|e| e.to_string())?;
        let mut lines = header_text.split("\r\n").filter(|line| !line.is_empty());
        let request_line = lines.next().unwrap_or_default().to_string();

        let mut headers = Vec::new();
        let mut content_length = 0_usize;
        for line in lines {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim().to_string();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().map_err(|_| "bad content-length")?;
            }
            headers.push((name.to_string(), value));
        }

        let mut body = buffer[header_end..].to_vec();
        while body.len() < content_length {
            let mut chunk = vec![0_u8; content_length - body.len()];
            let read = stream.read(&mut chunk).await.map_err(|e| e.to_string())?;
            if read == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..read]);
        }
        Ok((request_line, headers, body))
    }

    /// Serve one canned response and hand back what the client sent.
    async fn serve_once(
        status_line: &'static str,
        body: String,
    ) -> (String, Arc<Mutex<Option<CapturedRequest>>>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let addr = listener.local_addr().expect("local addr should resolve");
        let captured = Arc::new(Mutex::new(None));
        let captured_for_server = Arc::clone(&captured);

        tokio::spawn(async move {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            if let Ok(request) = read_http_request(&mut stream).await {
                *captured_for_server.lock().await = Some(request);
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        });

        (format!("http://{addr}/v1/"), captured)
    }

    fn config_for(base_url: String) -> CompletionConfig {
        CompletionConfig {
            base_url,
            model: "test-model".to_string(),
            temperature: 0.25,
            max_tokens: 64,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn posts_history_and_parses_reasoning() {
        let body = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "<think>\ncount letters\n</think>\n\nThree."
                },
                "finish_reason": "stop"
            }]
        })
        .to_string();
        let (base_url, captured) = serve_once("HTTP/1.1 200 OK", body).await;
        let client = HttpCompletionClient::new(&config_for(base_url), "secret").unwrap();

        let history = vec![
            ChatMessage::new("user", "How many r's in strawberry?"),
            ChatMessage::new("assistant", "Let me check."),
            ChatMessage::new("user", "Well?"),
        ];
        let completion = client.complete(&history).await.expect("completion");

        assert_eq!(completion.answer, "Three.");
        assert_eq!(completion.reasoning, "count letters");

        let (request_line, headers, body) =
            captured.lock().await.take().expect("request captured");
        assert_eq!(request_line, "POST /v1/chat/completions HTTP/1.1");
        let auth = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .map(|(_, value)| value.as_str());
        assert_eq!(auth, Some("Bearer secret"));

        let sent: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(sent["model"], "test-model");
        assert_eq!(sent["max_tokens"], 64);
        assert_eq!(sent["temperature"], 0.25);
        assert_eq!(sent["stream"], false);
        assert_eq!(sent["messages"].as_array().map(Vec::len), Some(3));
        assert_eq!(sent["messages"][1]["role"], "assistant");
    }

    #[tokio::test]
    async fn error_status_becomes_completion_error() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#;
        let (base_url, _) = serve_once("HTTP/1.1 401 Unauthorized", body.to_string()).await;
        let client = HttpCompletionClient::new(&config_for(base_url), "bad").unwrap();

        let err = client
            .complete(&[ChatMessage::new("user", "hi")])
            .await
            .expect_err("401 should fail");

        assert!(err.detail().contains("401"), "{err}");
        assert!(err.detail().contains("Invalid API Key"), "{err}");
        assert!(err.to_string().starts_with("Completion failed"));
    }

    #[tokio::test]
    async fn malformed_body_becomes_completion_error() {
        let (base_url, _) = serve_once("HTTP/1.1 200 OK", "not json".to_string()).await;
        let client = HttpCompletionClient::new(&config_for(base_url), "k").unwrap();

        let err = client
            .complete(&[ChatMessage::new("user", "hi")])
            .await
            .expect_err("garbage should fail");
        assert!(err.detail().starts_with("malformed response"), "{err}");
    }

    #[tokio::test]
    async fn unreachable_service_becomes_completion_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            HttpCompletionClient::new(&config_for(format!("http://{addr}/v1")), "k").unwrap();
        let err = client
            .complete(&[ChatMessage::new("user", "hi")])
            .await
            .expect_err("nothing is listening");
        assert!(err.detail().starts_with("request error"), "{err}");
    }

    #[test]
    fn from_raw_records_elapsed_time() {
        let completion = Completion::from_raw("plain", Duration::from_millis(1234));
        assert_eq!(completion.answer, "plain");
        assert_eq!(completion.reasoning, "");
        assert_eq!(completion.reasoning_elapsed_ms, 1234);
    }

    #[test]
    fn error_bodies_are_summarized() {
        assert_eq!(
            summarize_error_body(r#"{"error":{"message":"model\n  overloaded"}}"#),
            "model overloaded"
        );
        assert_eq!(summarize_error_body(r#"{"error":"quota"}"#), "quota");
        assert_eq!(summarize_error_body("  "), "<empty body>");
        assert_eq!(summarize_error_body("<html>bad gateway</html>"), "<html>bad gateway</html>");
    }
}
