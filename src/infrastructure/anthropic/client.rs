//! HTTP client for the Anthropic Messages API.
//!
//! Implements the `CompletionClient` port. Both transport modes end in the
//! same place: callers receive one final string whether the response arrived
//! whole or as SSE fragments. Transient failures (429/5xx/connection) are
//! retried with exponential backoff inside the adapter; authentication
//! failures, timeouts and malformed responses are fatal and never retried.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::errors::{FlowError, FlowResult};
use crate::domain::models::{ApiConfig, Role};
use crate::domain::ports::{CompletionClient, CompletionRequest};

use super::types::{ApiMessage, MessageRole, MessagesRequest, MessagesResponse, StreamEvent};

pub struct AnthropicClient {
    config: ApiConfig,
    stream: bool,
    http: Client,
}

impl AnthropicClient {
    pub fn new(config: ApiConfig, stream: bool) -> FlowResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FlowError::CompletionFailed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, stream, http })
    }

    fn api_key(&self) -> FlowResult<String> {
        self.config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or(FlowError::MissingCredential)
    }

    /// Map the port request onto the wire format. System turns are lifted
    /// into the request's `system` field; user/assistant turns become the
    /// alternating message list.
    fn build_request(&self, request: &CompletionRequest, stream: bool) -> MessagesRequest {
        let mut system_parts = Vec::new();
        let mut messages = Vec::new();
        for turn in &request.turns {
            match turn.role {
                Role::System => system_parts.push(turn.content.clone()),
                Role::User => {
                    messages.push(ApiMessage { role: MessageRole::User, content: turn.content.clone() });
                }
                Role::Assistant => {
                    messages
                        .push(ApiMessage { role: MessageRole::Assistant, content: turn.content.clone() });
                }
            }
        }
        let system = if system_parts.is_empty() { None } else { Some(system_parts.join("\n\n")) };
        MessagesRequest {
            model: request.model.clone(),
            max_tokens: self.config.max_tokens,
            system,
            messages,
            stream,
            temperature: Some(request.temperature),
        }
    }

    async fn post(&self, api_key: &str, body: &MessagesRequest) -> FlowResult<reqwest::Response> {
        let url = format!("{}/v1/messages", self.config.base_url);
        let mut backoff_ms = self.config.initial_backoff_ms;
        let mut attempt = 0u32;
        loop {
            let result = self
                .http
                .post(&url)
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-api-key", api_key)
                .header("anthropic-version", &self.config.api_version)
                .json(body)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let transient = status.as_u16() == 429 || status.is_server_error();
                    let text = response.text().await.unwrap_or_default();
                    if !transient || attempt >= self.config.max_retries {
                        return Err(FlowError::CompletionFailed(format!("API error {status}: {text}")));
                    }
                    warn!(%status, attempt, "transient API error, backing off");
                }
                Err(e) if e.is_timeout() => {
                    return Err(FlowError::CompletionFailed(format!(
                        "request timed out after {}s",
                        self.config.timeout_secs
                    )));
                }
                Err(e) => {
                    if attempt >= self.config.max_retries {
                        return Err(FlowError::CompletionFailed(format!("request failed: {e}")));
                    }
                    warn!(error = %e, attempt, "connection error, backing off");
                }
            }

            sleep(Duration::from_millis(backoff_ms)).await;
            backoff_ms = (backoff_ms * 2).min(self.config.max_backoff_ms);
            attempt += 1;
        }
    }

    async fn complete_sync(&self, request: &CompletionRequest) -> FlowResult<String> {
        let api_key = self.api_key()?;
        let body = self.build_request(request, false);
        let response = self.post(&api_key, &body).await?;

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| FlowError::CompletionFailed(format!("failed to parse response: {e}")))?;
        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "completion finished"
        );

        let text = parsed
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n");
        if text.is_empty() {
            return Err(FlowError::CompletionFailed("response contained no text content".to_string()));
        }
        Ok(text)
    }

    async fn complete_streaming(&self, request: &CompletionRequest) -> FlowResult<String> {
        let api_key = self.api_key()?;
        let body = self.build_request(request, true);
        let response = self.post(&api_key, &body).await?;

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| FlowError::CompletionFailed(format!("stream interrupted: {e}")))?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(newline) = buffer.find('\n') {
                let line = buffer[..newline].trim_end_matches('\r').to_string();
                buffer.drain(..=newline);
                match parse_sse_event(&line) {
                    Some(StreamEvent::ContentBlockDelta { delta }) => {
                        if !delta.text.is_empty() {
                            text.push_str(&delta.text);
                        }
                    }
                    Some(StreamEvent::Error { error }) => {
                        return Err(FlowError::CompletionFailed(format!(
                            "{}: {}",
                            error.error_type, error.message
                        )));
                    }
                    Some(StreamEvent::MessageStop) => {
                        if text.is_empty() {
                            return Err(FlowError::CompletionFailed(
                                "stream ended without content".to_string(),
                            ));
                        }
                        return Ok(text);
                    }
                    _ => {}
                }
            }
        }

        if text.is_empty() {
            return Err(FlowError::CompletionFailed("stream ended without content".to_string()));
        }
        Ok(text)
    }
}

/// Parse one SSE line into a stream event. Non-data lines and the `[DONE]`
/// sentinel yield `None`.
fn parse_sse_event(line: &str) -> Option<StreamEvent> {
    let json = line.strip_prefix("data: ")?;
    if json == "[DONE]" {
        return None;
    }
    serde_json::from_str(json).ok()
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> FlowResult<String> {
        if self.stream {
            self.complete_streaming(&request).await
        } else {
            self.complete_sync(&request).await
        }
    }
}
