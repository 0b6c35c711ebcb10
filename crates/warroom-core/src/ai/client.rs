//! OpenAI-compatible reasoning client.
//!
//! Talks to chat-completion backends that surface reasoning tokens as a
//! per-chunk `reasoning_content` field (NVIDIA Nemotron by default) and
//! exposes them as a labeled [`StreamPart`] channel. Separating reasoning
//! from content at the transport layer keeps agents free of lossy
//! text-splitting heuristics downstream.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::LlmError;

use super::config::{CallOptions, ReasoningClientConfig};
use super::model::ReasoningModel;
use super::sse::{parse_delta, SseLineBuffer, DONE_MARKER};
use super::types::{ChatMessage, Role, StreamPart};

/// Reasoning-token-aware LLM client.
pub struct ReasoningClient {
    config: ReasoningClientConfig,
    api_key: String,
    http: reqwest::Client,
}

impl ReasoningClient {
    /// Build a client, resolving the credential eagerly. A missing key is
    /// a construction-time failure, surfaced directly to the caller.
    pub fn new(config: ReasoningClientConfig) -> Result<Self, LlmError> {
        let api_key = config.resolve_api_key()?;
        Ok(Self {
            config,
            api_key,
            http: reqwest::Client::new(),
        })
    }

    /// Client with all defaults (credential from the environment).
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(ReasoningClientConfig::default())
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Prepend the reasoning-mode directive when the caller supplied no
    /// system turn. Backend convention; disabled via config.
    fn with_thinking_directive(&self, mut messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
        let has_system = messages.iter().any(|m| m.role == Role::System);
        if !has_system {
            if let Some(directive) = &self.config.thinking_directive {
                messages.insert(0, ChatMessage::system(directive));
            }
        }
        messages
    }

    fn request_body(&self, messages: &[ChatMessage], options: &CallOptions) -> Value {
        json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": options.temperature,
            "top_p": options.top_p,
            "max_tokens": options.max_tokens,
            "stream": options.stream,
            "min_thinking_tokens": self.config.min_thinking_tokens,
            "max_thinking_tokens": self.config.max_thinking_tokens,
        })
    }

    async fn send_request(&self, body: &Value) -> Result<reqwest::Response, LlmError> {
        let url = self.config.completions_url();
        debug!(model = %self.config.model, %url, "LLM request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(%status, %message, "LLM API error");
        Err(LlmError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Pump the SSE byte stream into labeled parts on a spawned task.
    ///
    /// Read and parse failures become a terminal `Error` part so the
    /// receiver never waits on a silently-dead channel.
    fn spawn_stream_pump(
        response: reqwest::Response,
        tx: mpsc::UnboundedSender<StreamPart>,
    ) {
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = SseLineBuffer::new();
            let mut chunk_count: u64 = 0;

            'read: while let Some(chunk) = stream.next().await {
                chunk_count += 1;
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        error!("stream read error at chunk #{}: {}", chunk_count, e);
                        let _ = tx.send(StreamPart::Error {
                            error: format!("stream read error: {}", e),
                        });
                        return;
                    }
                };

                for payload in buffer.push(&bytes) {
                    if payload == DONE_MARKER {
                        break 'read;
                    }
                    let parsed = serde_json::from_str::<Value>(&payload)
                        .map_err(anyhow::Error::from)
                        .and_then(|json| parse_delta(&json));
                    match parsed {
                        Ok(Some(part)) => {
                            let _ = tx.send(part);
                        }
                        Ok(None) => {}
                        Err(e) => {
                            warn!("chunk #{} parse error: {}", chunk_count, e);
                            let _ = tx.send(StreamPart::Error {
                                error: format!("stream parse error: {}", e),
                            });
                            return;
                        }
                    }
                }
            }

            info!("LLM stream ended after {} chunks", chunk_count);
        });
    }

    /// Produce the same two-kind partition from a one-shot response.
    fn partition_complete_response(
        body: &Value,
        tx: &mpsc::UnboundedSender<StreamPart>,
    ) {
        let message = body.pointer("/choices/0/message");

        if let Some(reasoning) = message
            .and_then(|m| m.get("reasoning_content"))
            .and_then(|r| r.as_str())
        {
            if !reasoning.is_empty() {
                let _ = tx.send(StreamPart::Reasoning {
                    text: reasoning.to_string(),
                });
            }
        }

        if let Some(content) = message
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
        {
            if !content.is_empty() {
                let _ = tx.send(StreamPart::Content {
                    text: content.to_string(),
                });
            }
        }
    }
}

#[async_trait]
impl ReasoningModel for ReasoningClient {
    async fn respond(
        &self,
        messages: Vec<ChatMessage>,
        options: CallOptions,
    ) -> Result<mpsc::UnboundedReceiver<StreamPart>, LlmError> {
        let messages = self.with_thinking_directive(messages);
        let body = self.request_body(&messages, &options);
        let response = self.send_request(&body).await?;

        let (tx, rx) = mpsc::unbounded_channel();

        if options.stream {
            Self::spawn_stream_pump(response, tx);
        } else {
            let body: Value = response.json().await?;
            Self::partition_complete_response(&body, &tx);
        }

        Ok(rx)
    }
}
