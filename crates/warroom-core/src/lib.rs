//! Warroom core - observable incident-investigation agents
//!
//! ## Agent runtime
//! - `AgentRuntime` - event emission, listener fan-out, tools, LLM reasoning
//! - `AgentEvent` / `EventKind` - the observable event protocol
//! - `IncidentCommander` - four-phase investigation workflow
//!
//! ## AI layer
//! - `ReasoningModel` - pluggable LLM capability (streamed reasoning + content)
//! - `ReasoningClient` - OpenAI-compatible client with reasoning-token support
//!
//! Consumers (CLI, web frontends) attach `EventListener`s to an agent and
//! drive it via `Agent::run`; every reasoning step arrives as an
//! `AgentEvent` before the run returns.

pub mod agent;
pub mod ai;
pub mod error;
pub mod incident;

pub use agent::commander::{IncidentCommander, InvestigationReport};
pub use agent::events::{AgentEvent, EventKind, EventListener};
pub use agent::runtime::{Agent, AgentRuntime};
pub use ai::client::ReasoningClient;
pub use ai::config::{CallOptions, ReasoningClientConfig};
pub use ai::model::ReasoningModel;
pub use error::{AgentError, LlmError};
pub use incident::Incident;
