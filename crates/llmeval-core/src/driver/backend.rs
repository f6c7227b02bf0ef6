//! Chat-completion transport.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use crate::error::{EvalError, RequestError};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// A successful completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// `choices[0].message.content`.
    pub content: String,
    /// Seconds from send to full body received, rounded to milliseconds.
    pub duration: f64,
}

/// A failed request, with the duration if one was captured before failing.
#[derive(Debug)]
pub struct RequestFailure {
    pub error: RequestError,
    pub duration: Option<f64>,
}

impl RequestFailure {
    /// Failure before a complete response arrived.
    pub fn without_duration(error: RequestError) -> Self {
        Self {
            error,
            duration: None,
        }
    }
}

/// One blocking-style request at a time; implementations must not retry.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, body: String) -> Result<Completion, RequestFailure>;
}

/// Round half-up to three decimals.
pub fn round_duration(elapsed: Duration) -> f64 {
    let millis = (elapsed.as_nanos() + 500_000) / 1_000_000;
    millis as f64 / 1000.0
}

/// `host:port` becomes `http://host:port/v1/chat/completions`; a full
/// `http(s)://` base URL is used as given.
pub fn endpoint_url(server: &str) -> String {
    let server = server.trim_end_matches('/');
    if server.starts_with("http://") || server.starts_with("https://") {
        format!("{}{}", server, COMPLETIONS_PATH)
    } else {
        format!("http://{}{}", server, COMPLETIONS_PATH)
    }
}

#[derive(Debug, Deserialize)]
struct ChatEnvelope {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Pull `choices[0].message.content` out of a response body.
pub fn extract_content(body: &[u8]) -> Result<String, RequestError> {
    let envelope: ChatEnvelope =
        serde_json::from_slice(body).map_err(|e| RequestError::Envelope(e.to_string()))?;
    envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| RequestError::Envelope("response has no choices".to_string()))?
        .message
        .content
        .ok_or_else(|| RequestError::Envelope("choice has no message content".to_string()))
}

/// `reqwest` client for an OpenAI-compatible `/v1/chat/completions` server.
///
/// No request timeout is configured: a hung backend blocks the run.
pub struct HttpChatBackend {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpChatBackend {
    pub fn new(server: &str) -> Result<Self, EvalError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("llmeval/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EvalError::HttpClient(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint_url(server),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn complete(&self, body: String) -> Result<Completion, RequestFailure> {
        let start = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| RequestFailure::without_duration(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(RequestFailure::without_duration(RequestError::Status {
                status: status.as_u16(),
                body,
            }));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RequestFailure::without_duration(e.into()))?;
        let duration = round_duration(start.elapsed());

        let content = extract_content(&bytes).map_err(|error| RequestFailure {
            error,
            duration: Some(duration),
        })?;
        Ok(Completion { content, duration })
    }
}
