//! Pluggable LLM capability trait.
//!
//! Agents depend on this trait, never on a concrete client, so a scripted
//! model can stand in during tests and other backends can be swapped in
//! without touching agent code.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::LlmError;

use super::config::CallOptions;
use super::types::{ChatMessage, StreamPart};

/// A chat-completion backend that labels reasoning separately from
/// answer content.
#[async_trait]
pub trait ReasoningModel: Send + Sync {
    /// Issue one call and return the labeled fragment stream.
    ///
    /// The stream is lazy, single-pass and finite: the channel closes when
    /// the backend signals completion. Re-invoking re-issues the
    /// underlying call. Mid-stream failures arrive as a terminal
    /// [`StreamPart::Error`]; no retry happens at this layer (a mid-stream
    /// retry would duplicate partial output).
    async fn respond(
        &self,
        messages: Vec<ChatMessage>,
        options: CallOptions,
    ) -> Result<mpsc::UnboundedReceiver<StreamPart>, LlmError>;

    /// Drain one call to a plain string: reasoning fragments are
    /// discarded, content fragments concatenated.
    async fn simple_query(
        &self,
        prompt: &str,
        system_message: Option<&str>,
        options: CallOptions,
    ) -> Result<String, LlmError> {
        let mut messages = Vec::new();
        if let Some(system) = system_message {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt));

        let mut rx = self.respond(messages, options).await?;
        let mut content = String::new();
        while let Some(part) = rx.recv().await {
            match part {
                StreamPart::Content { text } => content.push_str(&text),
                StreamPart::Reasoning { .. } => {}
                StreamPart::Error { error } => return Err(LlmError::Stream(error)),
            }
        }
        Ok(content)
    }
}
