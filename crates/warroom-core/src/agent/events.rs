//! Canonical event protocol for observable agents.
//!
//! `AgentEvent` is the single record of one reasoning/action step. Agents
//! construct events exactly once, at the moment of the step, and push them
//! synchronously to every registered listener. Consumers must treat a
//! received event as read-only; filtering and formatting are the
//! listener's responsibility.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open key-value bag attached to every event. Schema varies by kind
/// (confidence, tool name, severity) but the container is always present.
pub type Metadata = serde_json::Map<String, Value>;

/// The closed set of observable step kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Thinking,
    Action,
    Observation,
    Theory,
    Challenge,
    Decision,
}

impl EventKind {
    /// The wire tag used in serialized events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thinking => "thinking",
            Self::Action => "action",
            Self::Observation => "observation",
            Self::Theory => "theory",
            Self::Challenge => "challenge",
            Self::Decision => "decision",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observable unit of agent behavior.
///
/// Created once by the emitting agent; never mutated after construction.
#[derive(Debug, Clone, Serialize)]
pub struct AgentEvent {
    pub agent_name: String,
    pub kind: EventKind,
    pub content: String,
    pub metadata: Metadata,
    pub timestamp: DateTime<Utc>,
}

impl AgentEvent {
    /// Construct an event, stamping the current time. Infallible.
    pub fn new(
        agent_name: impl Into<String>,
        kind: EventKind,
        content: impl Into<String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            kind,
            content: content.into(),
            metadata,
            timestamp: Utc::now(),
        }
    }

    /// Stable structural projection for transport (sockets, log sinks).
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "agent": self.agent_name,
            "type": self.kind.as_str(),
            "content": self.content,
            "metadata": self.metadata,
            "timestamp": self.timestamp.to_rfc3339(),
        })
    }
}

impl fmt::Display for AgentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.agent_name, self.kind, self.content)
    }
}

/// Receiver of agent events.
///
/// Called synchronously and frequently, in registration order; must not
/// block indefinitely and must not mutate the event. The interface is
/// infallible by construction - a panicking listener aborts the emitting
/// step (propagate-and-abort policy).
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &AgentEvent);
}

impl<F> EventListener for F
where
    F: Fn(&AgentEvent) + Send + Sync,
{
    fn on_event(&self, event: &AgentEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_defaults_to_empty_metadata_projection() {
        let event = AgentEvent::new("Commander", EventKind::Thinking, "hm", Metadata::new());
        let value = event.to_value();
        assert_eq!(value["agent"], "Commander");
        assert_eq!(value["type"], "thinking");
        assert_eq!(value["content"], "hm");
        assert!(value["metadata"].as_object().unwrap().is_empty());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn kind_tags_are_the_six_wire_tags() {
        let kinds = [
            EventKind::Thinking,
            EventKind::Action,
            EventKind::Observation,
            EventKind::Theory,
            EventKind::Challenge,
            EventKind::Decision,
        ];
        let tags: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            tags,
            [
                "thinking",
                "action",
                "observation",
                "theory",
                "challenge",
                "decision"
            ]
        );
    }

    #[test]
    fn display_matches_bracketed_form() {
        let event = AgentEvent::new("Commander", EventKind::Decision, "done", Metadata::new());
        assert_eq!(event.to_string(), "[Commander] decision: done");
    }
}
