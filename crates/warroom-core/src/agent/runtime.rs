//! Generic agent capabilities: event emission, listener fan-out, tool
//! invocation, LLM-backed reasoning, conversational history.
//!
//! Concrete agents (see `commander`) compose over an `AgentRuntime` rather
//! than inheriting from it. The runtime itself carries no phase concept -
//! state machines live in the concrete agents.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::ai::config::CallOptions;
use crate::ai::model::ReasoningModel;
use crate::ai::types::{ChatMessage, StreamPart};
use crate::error::{AgentError, LlmError};

use super::events::{AgentEvent, EventKind, EventListener, Metadata};
use super::tools::AgentTool;

/// Observation summaries are truncated to keep event streams compact.
const RESULT_SUMMARY_LEN: usize = 100;

/// Confidence attached to a theory when the proposer gives no estimate.
pub const DEFAULT_THEORY_CONFIDENCE: f64 = 0.5;

/// One prompt/response exchange with the LLM, reasoning included.
#[derive(Debug, Clone, Serialize)]
pub struct LlmExchange {
    pub prompt: String,
    pub reasoning: String,
    pub response: String,
}

/// Reusable capability set for one investigation participant.
pub struct AgentRuntime {
    name: String,
    role: String,
    llm: Option<Arc<dyn ReasoningModel>>,
    listeners: Vec<Arc<dyn EventListener>>,
    tools: HashMap<String, Arc<dyn AgentTool>>,
    context: HashMap<String, Value>,
    history: Vec<LlmExchange>,
}

impl AgentRuntime {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        llm: Option<Arc<dyn ReasoningModel>>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            llm,
            listeners: Vec::new(),
            tools: HashMap::new(),
            context: HashMap::new(),
            history: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Register a tool under a name. Last registration wins.
    pub fn register_tool(&mut self, name: impl Into<String>, tool: Arc<dyn AgentTool>) {
        self.tools.insert(name.into(), tool);
    }

    /// Append a listener. No de-duplication; removal is not supported
    /// during a run.
    pub fn add_event_listener(&mut self, listener: Arc<dyn EventListener>) {
        self.listeners.push(listener);
    }

    /// Working-memory merge. Internal bookkeeping, emits no event.
    pub fn update_context(&mut self, key: impl Into<String>, value: Value) {
        self.context.insert(key.into(), value);
    }

    pub fn context(&self) -> &HashMap<String, Value> {
        &self.context
    }

    pub fn history(&self) -> &[LlmExchange] {
        &self.history
    }

    /// Construct an event and synchronously notify every listener, in
    /// registration order, before returning it. Slow listeners delay the
    /// agent's next step.
    pub fn emit(
        &self,
        kind: EventKind,
        content: impl Into<String>,
        metadata: Metadata,
    ) -> AgentEvent {
        let event = AgentEvent::new(&self.name, kind, content, metadata);
        for listener in &self.listeners {
            listener.on_event(&event);
        }
        event
    }

    /// Emit a thinking step.
    pub fn think(&self, thought: impl Into<String>) -> AgentEvent {
        self.emit(EventKind::Thinking, thought, Metadata::new())
    }

    pub fn think_with(&self, thought: impl Into<String>, metadata: Metadata) -> AgentEvent {
        self.emit(EventKind::Thinking, thought, metadata)
    }

    /// Emit an observation.
    pub fn observe(&self, observation: impl Into<String>) -> AgentEvent {
        self.emit(EventKind::Observation, observation, Metadata::new())
    }

    pub fn observe_with(&self, observation: impl Into<String>, metadata: Metadata) -> AgentEvent {
        self.emit(EventKind::Observation, observation, metadata)
    }

    /// Propose a root-cause theory at [`DEFAULT_THEORY_CONFIDENCE`].
    pub fn propose_theory(&self, theory: impl Into<String>, metadata: Metadata) -> AgentEvent {
        self.propose_theory_with(theory, DEFAULT_THEORY_CONFIDENCE, metadata)
    }

    /// Propose a root-cause theory with an explicit confidence,
    /// conventionally in [0, 1], not enforced.
    pub fn propose_theory_with(
        &self,
        theory: impl Into<String>,
        confidence: f64,
        mut metadata: Metadata,
    ) -> AgentEvent {
        metadata.insert("confidence".to_string(), json!(confidence));
        self.emit(EventKind::Theory, theory, metadata)
    }

    /// Challenge another agent's theory by id.
    pub fn challenge_theory(
        &self,
        theory_id: &str,
        challenge: impl Into<String>,
        mut metadata: Metadata,
    ) -> AgentEvent {
        metadata.insert("theory_id".to_string(), json!(theory_id));
        self.emit(EventKind::Challenge, challenge, metadata)
    }

    /// Emit a decision.
    pub fn decide(&self, decision: impl Into<String>, metadata: Metadata) -> AgentEvent {
        self.emit(EventKind::Decision, decision, metadata)
    }

    /// Invoke a registered tool by name.
    ///
    /// Emits an Action event before awaiting the tool and an Observation
    /// event (truncated result summary) after it completes. An unknown
    /// name fails before any event is emitted.
    pub async fn use_tool(&self, name: &str, args: Value) -> Result<Value, AgentError> {
        let tool = self
            .tools
            .get(name)
            .cloned()
            .ok_or_else(|| AgentError::ToolNotRegistered {
                name: name.to_string(),
            })?;

        self.emit(
            EventKind::Action,
            format!("Using tool: {}", name),
            Metadata::from_iter([
                ("tool".to_string(), json!(name)),
                ("args".to_string(), args.clone()),
            ]),
        );

        let result = tool
            .invoke(args)
            .await
            .map_err(|source| AgentError::Tool {
                name: name.to_string(),
                source,
            })?;

        let summary: String = result.to_string().chars().take(RESULT_SUMMARY_LEN).collect();
        self.emit(
            EventKind::Observation,
            format!("Tool '{}' returned results", name),
            Metadata::from_iter([
                ("tool".to_string(), json!(name)),
                ("result_summary".to_string(), json!(summary)),
            ]),
        );

        Ok(result)
    }

    /// Ask the attached LLM to reason about a problem.
    ///
    /// Reasoning fragments become Thinking events tagged
    /// `llm_reasoning: true` (when `emit_reasoning` is set) so consumers
    /// can tell model-internal reasoning from the agent's own narration;
    /// content fragments accumulate silently. The full exchange is
    /// appended to history on success.
    pub async fn reason(
        &mut self,
        prompt: &str,
        system_context: Option<&str>,
        emit_reasoning: bool,
    ) -> Result<String, AgentError> {
        let llm = self
            .llm
            .clone()
            .ok_or_else(|| AgentError::NoLlmConfigured {
                agent: self.name.clone(),
            })?;

        let mut messages = Vec::new();
        if let Some(system) = system_context {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt));

        let mut rx = llm.respond(messages, CallOptions::default()).await?;

        let mut reasoning = String::new();
        let mut response = String::new();

        while let Some(part) = rx.recv().await {
            match part {
                StreamPart::Reasoning { text } => {
                    if emit_reasoning {
                        self.think_with(
                            text.as_str(),
                            Metadata::from_iter([("llm_reasoning".to_string(), json!(true))]),
                        );
                    }
                    reasoning.push_str(&text);
                }
                StreamPart::Content { text } => response.push_str(&text),
                StreamPart::Error { error } => return Err(LlmError::Stream(error).into()),
            }
        }

        debug!(
            agent = %self.name,
            reasoning_len = reasoning.len(),
            response_len = response.len(),
            "LLM reasoning complete"
        );

        self.history.push(LlmExchange {
            prompt: prompt.to_string(),
            reasoning,
            response: response.clone(),
        });

        Ok(response)
    }
}

/// One participant in the investigation.
///
/// `run` drives the agent's own workflow against a context object
/// (typically `{"incident": {...}}`) and resolves to a result mapping.
#[async_trait]
pub trait Agent: Send {
    fn runtime(&self) -> &AgentRuntime;
    fn runtime_mut(&mut self) -> &mut AgentRuntime;

    async fn run(&mut self, context: Value) -> Result<Value, AgentError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::agent::tools::FnTool;
    use crate::ai::model::tests::ScriptedModel;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<AgentEvent>>,
    }

    impl EventListener for Recorder {
        fn on_event(&self, event: &AgentEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn runtime() -> AgentRuntime {
        AgentRuntime::new("Commander", "Incident Commander", None)
    }

    #[test]
    fn emit_reaches_every_listener_in_registration_order() {
        let mut rt = runtime();
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        rt.add_event_listener(Arc::new(move |_: &AgentEvent| {
            first.lock().unwrap().push("first");
        }));
        let second = Arc::clone(&order);
        rt.add_event_listener(Arc::new(move |_: &AgentEvent| {
            second.lock().unwrap().push("second");
        }));

        rt.think("checking fan-out");
        assert_eq!(*order.lock().unwrap(), ["first", "second"]);
    }

    #[test]
    fn timestamps_are_non_decreasing_within_a_run() {
        let mut rt = runtime();
        let recorder = Arc::new(Recorder::default());
        rt.add_event_listener(recorder.clone());

        for i in 0..10 {
            rt.think(format!("step {i}"));
        }

        let events = recorder.events.lock().unwrap();
        for pair in events.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn propose_theory_attaches_explicit_confidence() {
        let rt = runtime();
        let event = rt.propose_theory_with("pool exhaustion", 0.7, Metadata::new());
        assert_eq!(event.kind, EventKind::Theory);
        assert_eq!(event.metadata["confidence"], json!(0.7));
    }

    #[test]
    fn propose_theory_defaults_confidence() {
        let rt = runtime();
        let event = rt.propose_theory("pool exhaustion", Metadata::new());
        assert_eq!(event.metadata["confidence"], json!(DEFAULT_THEORY_CONFIDENCE));
        assert_eq!(event.metadata["confidence"], json!(0.5));
    }

    #[test]
    fn challenge_theory_attaches_theory_id() {
        let rt = runtime();
        let event = rt.challenge_theory("t-1", "metrics disagree", Metadata::new());
        assert_eq!(event.metadata["theory_id"], json!("t-1"));
    }

    #[tokio::test]
    async fn use_tool_emits_action_then_observation() {
        let mut rt = runtime();
        let recorder = Arc::new(Recorder::default());
        rt.add_event_listener(recorder.clone());
        rt.register_tool(
            "query_metrics",
            Arc::new(FnTool::new(|_| async move { Ok(json!({"p99_ms": 3000})) })),
        );

        let result = rt
            .use_tool("query_metrics", json!({"service": "user-api"}))
            .await
            .unwrap();
        assert_eq!(result["p99_ms"], 3000);

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::Action);
        assert_eq!(events[0].metadata["tool"], json!("query_metrics"));
        assert_eq!(events[1].kind, EventKind::Observation);
        assert!(events[1].metadata["result_summary"].is_string());
    }

    #[tokio::test]
    async fn use_tool_unknown_name_fails_without_events() {
        let mut rt = runtime();
        let recorder = Arc::new(Recorder::default());
        rt.add_event_listener(recorder.clone());

        let err = rt.use_tool("missing", json!({})).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolNotRegistered { ref name } if name == "missing"));
        assert!(recorder.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn last_tool_registration_wins() {
        let mut rt = runtime();
        rt.register_tool(
            "probe",
            Arc::new(FnTool::new(|_| async move { Ok(json!("old")) })),
        );
        rt.register_tool(
            "probe",
            Arc::new(FnTool::new(|_| async move { Ok(json!("new")) })),
        );
        assert_eq!(rt.use_tool("probe", json!({})).await.unwrap(), json!("new"));
    }

    #[tokio::test]
    async fn reason_without_llm_fails_and_keeps_history_empty() {
        let mut rt = runtime();
        let err = rt.reason("why?", None, true).await.unwrap_err();
        assert!(matches!(err, AgentError::NoLlmConfigured { .. }));
        assert!(rt.history().is_empty());
    }

    #[tokio::test]
    async fn reason_emits_reasoning_as_thinking_and_records_history() {
        let model = Arc::new(ScriptedModel::new(vec![
            StreamPart::Reasoning {
                text: "considering the pool".to_string(),
            },
            StreamPart::Content {
                text: "Pool ".to_string(),
            },
            StreamPart::Content {
                text: "exhausted".to_string(),
            },
        ]));
        let mut rt = AgentRuntime::new("Commander", "Incident Commander", Some(model));
        let recorder = Arc::new(Recorder::default());
        rt.add_event_listener(recorder.clone());

        let response = rt.reason("root cause?", Some("be brief"), true).await.unwrap();
        assert_eq!(response, "Pool exhausted");

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Thinking);
        assert_eq!(events[0].metadata["llm_reasoning"], json!(true));

        let history = rt.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].prompt, "root cause?");
        assert_eq!(history[0].reasoning, "considering the pool");
        assert_eq!(history[0].response, "Pool exhausted");
    }

    #[tokio::test]
    async fn reason_suppresses_thinking_events_when_disabled() {
        let model = Arc::new(ScriptedModel::new(vec![
            StreamPart::Reasoning {
                text: "quiet".to_string(),
            },
            StreamPart::Content {
                text: "answer".to_string(),
            },
        ]));
        let mut rt = AgentRuntime::new("Commander", "Incident Commander", Some(model));
        let recorder = Arc::new(Recorder::default());
        rt.add_event_listener(recorder.clone());

        let response = rt.reason("root cause?", None, false).await.unwrap();
        assert_eq!(response, "answer");
        assert!(recorder.events.lock().unwrap().is_empty());
        assert_eq!(rt.history()[0].reasoning, "quiet");
    }

    #[tokio::test]
    async fn reason_aborts_on_stream_error_without_recording_history() {
        let model = Arc::new(ScriptedModel::new(vec![
            StreamPart::Reasoning {
                text: "partial thought".to_string(),
            },
            StreamPart::Error {
                error: "connection reset".to_string(),
            },
        ]));
        let mut rt = AgentRuntime::new("Commander", "Incident Commander", Some(model));

        let err = rt.reason("root cause?", None, true).await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::Llm(LlmError::Stream(ref message)) if message == "connection reset"
        ));
        assert!(rt.history().is_empty());
    }
}
