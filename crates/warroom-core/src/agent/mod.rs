//! Agent system for Warroom
//!
//! ## Core components
//! - `AgentEvent` / `EventKind` - canonical observable event protocol
//! - `EventListener` - synchronous fan-out contract for visualizers
//! - `AgentRuntime` - generic capabilities every agent composes over
//! - `AgentTool` - asynchronous capability an agent invokes by name
//!
//! ## Concrete agents
//! - `IncidentCommander` - linear four-phase investigation workflow

pub mod commander;
pub mod events;
pub mod runtime;
pub mod tools;

pub use commander::{
    CommanderTiming, DelegatedTask, IncidentCommander, InvestigationPhase, InvestigationReport,
    RootCauseAnalysis, Theory,
};
pub use events::{AgentEvent, EventKind, EventListener, Metadata};
pub use runtime::{Agent, AgentRuntime, LlmExchange, DEFAULT_THEORY_CONFIDENCE};
pub use tools::{AgentTool, FnTool};
