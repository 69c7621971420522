//! Chat-completion client for the external model service.
//!
//! The service speaks the OpenAI-compatible `/chat/completions` protocol
//! (Groq by default). One request per call and no retries; the first failure
//! is returned to the caller.

use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::config::{ModelConfig, SamplingConfig};
use crate::models::assistant::ChatMessage;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model service credentials missing or rejected: {0}")]
    UpstreamAuth(String),

    #[error("Model service unreachable: {0}")]
    UpstreamUnavailable(String),

    #[error("Model service did not answer within {0:?}")]
    UpstreamTimeout(Duration),

    #[error("Model service returned an unusable response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<ChatMessage>,
    pub sampling: SamplingConfig,
}

impl CompletionRequest {
    /// A single user turn under a system instruction.
    pub fn new(prompt: impl Into<String>, system: impl Into<String>, sampling: SamplingConfig) -> Self {
        Self {
            system: system.into(),
            messages: vec![ChatMessage::user(prompt)],
            sampling,
        }
    }

    pub fn with_history(
        system: impl Into<String>,
        history: Vec<ChatMessage>,
        prompt: impl Into<String>,
        sampling: SamplingConfig,
    ) -> Self {
        let mut messages = history;
        messages.push(ChatMessage::user(prompt));
        Self {
            system: system.into(),
            messages,
            sampling,
        }
    }
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the text of the first completion choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError>;
}

/// Runs a completion bounded by `deadline`.
pub async fn complete_within(
    client: &dyn CompletionClient,
    request: &CompletionRequest,
    deadline: Duration,
) -> Result<String, ModelError> {
    match tokio::time::timeout(deadline, client.complete(request)).await {
        Ok(result) => result,
        Err(_) => Err(ModelError::UpstreamTimeout(deadline)),
    }
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

/// Pulls `error.message` out of an error body, falling back to the raw text.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(300).collect())
}

/// Message for a non-2xx reply. A body that cannot be read is reported in
/// place of the API's own message.
fn failure_message<E: fmt::Display>(status: StatusCode, body: Result<String, E>) -> String {
    match body {
        Ok(text) => format!("HTTP {}: {}", status, api_message(&text)),
        Err(e) => {
            debug!("Failed to read error body: {}", e);
            format!("HTTP {}: error body unreadable ({})", status, e)
        }
    }
}

#[derive(Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GroqClient {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::UpstreamUnavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: build_chat_url(&config.base_url),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> ModelError {
        if err.is_timeout() {
            ModelError::UpstreamTimeout(self.timeout)
        } else {
            ModelError::UpstreamUnavailable(err.to_string())
        }
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ModelError::UpstreamAuth("GROQ_API_KEY not set".to_string()))?;

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: &request.system,
        });
        messages.extend(request.messages.iter().map(|message| WireMessage {
            role: &message.role,
            content: &message.content,
        }));

        let body = ChatCompletionBody {
            model: &request.sampling.model,
            messages,
            temperature: request.sampling.temperature,
            max_tokens: request.sampling.max_tokens,
        };

        debug!(
            "Requesting completion: model={}, messages={}, max_tokens={}",
            body.model,
            body.messages.len(),
            body.max_tokens
        );

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = failure_message(status, response.text().await);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ModelError::UpstreamAuth(message),
                _ => ModelError::UpstreamUnavailable(message),
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ModelError::InvalidResponse("completion had no content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sleepy;

    #[async_trait]
    impl CompletionClient for Sleepy {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, ModelError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }
    }

    #[test]
    fn test_build_chat_url() {
        assert_eq!(
            build_chat_url("https://api.groq.com/openai/v1/"),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(
            build_chat_url("http://localhost:1234/chat/completions"),
            "http://localhost:1234/chat/completions"
        );
    }

    #[test]
    fn test_api_message_prefers_error_message() {
        assert_eq!(
            api_message(r#"{"error":{"message":"Invalid API Key"}}"#),
            "Invalid API Key"
        );
        assert_eq!(api_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_unreadable_error_body_is_reported() {
        let message = failure_message(
            StatusCode::BAD_GATEWAY,
            Err::<String, _>("connection reset mid-body"),
        );
        assert_eq!(
            message,
            "HTTP 502 Bad Gateway: error body unreadable (connection reset mid-body)"
        );
        assert_eq!(
            failure_message(StatusCode::SERVICE_UNAVAILABLE, Ok::<_, String>("overloaded".into())),
            "HTTP 503 Service Unavailable: overloaded"
        );
    }

    #[test]
    fn test_with_history_appends_prompt_last() {
        let sampling = SamplingConfig::default();
        let request = CompletionRequest::with_history(
            "system",
            vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")],
            "where to?",
            sampling,
        );
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[2], ChatMessage::user("where to?"));
    }

    #[tokio::test]
    async fn test_deadline_surfaces_timeout() {
        let request = CompletionRequest::new("p", "s", SamplingConfig::default());
        let err = complete_within(&Sleepy, &request, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::UpstreamTimeout(d) if d == Duration::from_millis(10)));
    }
}
