//! Error taxonomy for the agent runtime and the AI layer.
//!
//! Validation-style errors (missing credential, unknown tool) surface at the
//! point of misuse. Transport failures propagate to the immediate caller;
//! the only place local degradation happens is the commander's conclusion
//! phase, which falls back to rule-based analysis.

use thiserror::Error;

/// Errors from the LLM client layer.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Required credential or endpoint configuration missing. Fatal at
    /// construction time, never silently degraded.
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    /// Connection-level failure talking to the backend.
    #[error("LLM transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend returned a non-success HTTP status.
    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Failure surfaced mid-stream, after the response started.
    #[error("LLM stream error: {0}")]
    Stream(String),
}

/// Errors from agent operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// `reason()` was called on an agent with no LLM attached.
    #[error("agent '{agent}' has no LLM client configured")]
    NoLlmConfigured { agent: String },

    /// `use_tool()` was called with a name that was never registered.
    #[error("tool '{name}' is not registered")]
    ToolNotRegistered { name: String },

    /// A registered tool failed during invocation.
    #[error("tool '{name}' failed: {source}")]
    Tool {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Llm(#[from] LlmError),
}
