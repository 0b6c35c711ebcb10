//! Incident Commander - the four-phase investigation workflow.
//!
//! Linear state machine, no backtracking:
//! `initial -> delegating -> synthesizing -> concluding -> resolved`.
//!
//! Delegation is a simulated task record in this scope. The
//! area-to-specialist table is the seam where live sub-agents plug in:
//! swapping `assigned_to` for a real agent instance must not change the
//! phase's external contract. An investigation always reaches a terminal
//! decision - LLM failures during conclusion degrade to the rule-based
//! path instead of aborting the run.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::ai::model::ReasoningModel;
use crate::error::AgentError;
use crate::incident::Incident;

use super::events::{EventKind, EventListener, Metadata};
use super::runtime::{Agent, AgentRuntime};

/// LLM-backed conclusions carry higher confidence than rule matching.
const LLM_CONFIDENCE: f64 = 0.85;
const RULE_CONFIDENCE: f64 = 0.5;

const UNKNOWN_ROOT_CAUSE: &str = "Unknown - requires deeper investigation";
const LATENCY_ROOT_CAUSE: &str =
    "Database connection pool exhaustion due to recent config change";
const ERROR_ROOT_CAUSE: &str =
    "Increased error rate due to code deployment or external dependency failure";

const COMMANDER_SYSTEM_CONTEXT: &str = "\
You are a senior SRE and incident commander with deep expertise in:
- Distributed systems debugging
- Performance analysis
- Root cause analysis
- Production incident response

Analyze incidents systematically and provide actionable root cause determinations.";

/// Stage of the commander's linear investigation state machine.
/// Advances monotonically within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationPhase {
    Initial,
    Delegating,
    Synthesizing,
    Concluding,
    Resolved,
}

/// Simulated delegation record created during the delegate phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegatedTask {
    pub area: String,
    pub assigned_to: String,
    pub status: String,
}

/// Root-cause theory received from another agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Theory {
    pub description: Option<String>,
    pub agent: Option<String>,
    pub confidence: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Theory {
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("Unknown")
    }

    pub fn agent(&self) -> &str {
        self.agent.as_deref().unwrap_or("Unknown")
    }
}

/// Simulated turnaround delays between phases. Purely demo pacing - they
/// carry no correctness obligation and are zeroed in tests.
#[derive(Debug, Clone)]
pub struct CommanderTiming {
    pub delegation_wait: Duration,
    pub synthesis_wait: Duration,
}

impl Default for CommanderTiming {
    fn default() -> Self {
        Self {
            delegation_wait: Duration::from_millis(500),
            synthesis_wait: Duration::from_millis(300),
        }
    }
}

impl CommanderTiming {
    pub fn instant() -> Self {
        Self {
            delegation_wait: Duration::ZERO,
            synthesis_wait: Duration::ZERO,
        }
    }
}

/// Final result returned to the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationReport {
    pub status: String,
    pub root_cause: String,
    pub timeline: Vec<Value>,
}

/// Root-cause determination with its confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct RootCauseAnalysis {
    pub cause: String,
    pub confidence: f64,
}

/// The incident commander orchestrates the war room response.
pub struct IncidentCommander {
    runtime: AgentRuntime,
    phase: InvestigationPhase,
    theories: Vec<Theory>,
    assigned_tasks: Vec<DelegatedTask>,
    timing: CommanderTiming,
}

impl IncidentCommander {
    pub fn new(llm: Option<Arc<dyn ReasoningModel>>) -> Self {
        Self {
            runtime: AgentRuntime::new("Commander", "Incident Commander", llm),
            phase: InvestigationPhase::Initial,
            theories: Vec::new(),
            assigned_tasks: Vec::new(),
            timing: CommanderTiming::default(),
        }
    }

    pub fn with_timing(mut self, timing: CommanderTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn phase(&self) -> InvestigationPhase {
        self.phase
    }

    pub fn theories(&self) -> &[Theory] {
        &self.theories
    }

    pub fn assigned_tasks(&self) -> &[DelegatedTask] {
        &self.assigned_tasks
    }

    pub fn add_event_listener(&mut self, listener: Arc<dyn EventListener>) {
        self.runtime.add_event_listener(listener);
    }

    /// Execute the full incident response workflow.
    pub async fn investigate(&mut self, context: Value) -> Result<InvestigationReport, AgentError> {
        let incident_value = context.get("incident").cloned().unwrap_or(Value::Null);
        let incident = Incident::from_value(&incident_value);
        self.runtime.update_context("incident", incident_value);

        self.phase = InvestigationPhase::Initial;
        self.assess_incident(&incident);

        self.phase = InvestigationPhase::Delegating;
        self.delegate_investigation().await;

        self.phase = InvestigationPhase::Synthesizing;
        self.synthesize_findings().await;

        self.phase = InvestigationPhase::Concluding;
        let analysis = self.determine_root_cause().await;

        self.phase = InvestigationPhase::Resolved;
        info!(root_cause = %analysis.cause, "investigation resolved");

        let timeline = self
            .runtime
            .context()
            .get("timeline")
            .and_then(|t| t.as_array())
            .cloned()
            .unwrap_or_default();

        Ok(InvestigationReport {
            status: "resolved".to_string(),
            root_cause: analysis.cause,
            timeline,
        })
    }

    /// Phase 1: classify the incident and pick an investigation order.
    pub fn assess_incident(&mut self, incident: &Incident) {
        self.runtime.think("Beginning incident assessment...");

        let symptom = incident.symptom();
        self.runtime.think_with(
            format!("Incident: {} on {}", symptom, incident.service()),
            Metadata::from_iter([("severity".to_string(), json!(incident.severity()))]),
        );

        let symptom_lower = symptom.to_lowercase();
        let priority: [&str; 3] = if symptom_lower.contains("latency") {
            self.runtime
                .think("Latency issue detected. Likely performance-related.");
            ["metrics", "recent_changes", "logs"]
        } else if symptom_lower.contains("error") {
            self.runtime
                .think("Error spike detected. Likely code or infrastructure issue.");
            ["logs", "recent_changes", "metrics"]
        } else {
            self.runtime
                .think("Unclear symptom. Need comprehensive investigation.");
            ["logs", "metrics", "recent_changes"]
        };

        self.runtime
            .update_context("investigation_priority", json!(priority));

        self.runtime.decide(
            format!("Investigation priority: {}", priority.join(" > ")),
            Metadata::from_iter([("priority".to_string(), json!(priority))]),
        );
    }

    /// Phase 2: record delegation tasks for each priority area.
    async fn delegate_investigation(&mut self) {
        let areas: Vec<String> = self
            .runtime
            .context()
            .get("investigation_priority")
            .and_then(|p| p.as_array())
            .map(|areas| {
                areas
                    .iter()
                    .filter_map(|a| a.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        for area in areas {
            self.runtime.think(format!("Need to investigate: {}", area));

            let task = DelegatedTask {
                area: area.clone(),
                assigned_to: specialist_for(&area).to_string(),
                status: "pending".to_string(),
            };

            self.runtime.emit(
                EventKind::Action,
                format!("Delegating {} investigation to {}", area, task.assigned_to),
                Metadata::from_iter([("task".to_string(), json!(task))]),
            );
            self.assigned_tasks.push(task);
        }

        // Simulated delegate turnaround; live sub-agents replace this.
        tokio::time::sleep(self.timing.delegation_wait).await;
    }

    /// Phase 3: aggregate whatever theories have arrived so far.
    async fn synthesize_findings(&mut self) {
        self.runtime
            .think("Synthesizing findings from investigation teams...");

        tokio::time::sleep(self.timing.synthesis_wait).await;

        self.runtime.observe_with(
            "Received theories from investigation teams",
            Metadata::from_iter([("theory_count".to_string(), json!(self.theories.len()))]),
        );
    }

    /// Phase 4: determine the root cause, preferring LLM reasoning and
    /// degrading to rules on any LLM failure.
    pub async fn determine_root_cause(&mut self) -> RootCauseAnalysis {
        self.runtime
            .think("Analyzing all evidence to determine root cause...");

        let incident = Incident::from_value(
            self.runtime
                .context()
                .get("incident")
                .unwrap_or(&Value::Null),
        );

        let analysis = if self.runtime.has_llm() {
            self.runtime
                .think("Using LLM reasoning to analyze incident...");

            let prompt = self.build_root_cause_prompt(&incident);
            match self
                .runtime
                .reason(&prompt, Some(COMMANDER_SYSTEM_CONTEXT), true)
                .await
            {
                Ok(response) => RootCauseAnalysis {
                    cause: response.trim().to_string(),
                    confidence: LLM_CONFIDENCE,
                },
                Err(e) => {
                    warn!(error = %e, "LLM root cause analysis failed");
                    self.runtime.think(format!(
                        "LLM reasoning failed: {}. Falling back to rule-based analysis.",
                        e
                    ));
                    RootCauseAnalysis {
                        cause: self.fallback_root_cause(&incident),
                        confidence: RULE_CONFIDENCE,
                    }
                }
            }
        } else {
            RootCauseAnalysis {
                cause: self.fallback_root_cause(&incident),
                confidence: RULE_CONFIDENCE,
            }
        };

        self.runtime.think_with(
            format!(
                "Root cause analysis complete. Confidence: {:.0}%",
                analysis.confidence * 100.0
            ),
            Metadata::from_iter([("confidence".to_string(), json!(analysis.confidence))]),
        );

        self.runtime.decide(
            format!("ROOT CAUSE: {}", analysis.cause),
            Metadata::from_iter([
                ("confidence".to_string(), json!(analysis.confidence)),
                ("root_cause".to_string(), json!(analysis.cause)),
            ]),
        );

        analysis
    }

    fn build_root_cause_prompt(&self, incident: &Incident) -> String {
        let areas: Vec<String> = self
            .runtime
            .context()
            .get("investigation_priority")
            .and_then(|p| p.as_array())
            .map(|areas| {
                areas
                    .iter()
                    .filter_map(|a| a.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        format!(
            "\
You are an incident commander analyzing a production incident.

INCIDENT DETAILS:
- ID: {}
- Symptom: {}
- Severity: {}
- Service: {}
- Impact: {}

INVESTIGATION AREAS EXAMINED:
{}

Based on the incident symptoms and investigation areas, determine the most likely root cause.
Provide your analysis and the root cause determination.",
            incident.id(),
            incident.symptom(),
            incident.severity(),
            incident.service(),
            incident.impact(),
            areas.join(", ")
        )
    }

    /// Rule-based analysis used when no LLM is attached or it failed.
    fn fallback_root_cause(&self, incident: &Incident) -> String {
        if incident.is_empty() {
            return UNKNOWN_ROOT_CAUSE.to_string();
        }

        let symptom = incident.symptom().to_lowercase();
        if symptom.contains("latency") {
            self.runtime.think_with(
                "Evidence pattern matches: latency spike + recent deploy + database metrics",
                Metadata::from_iter([(
                    "pattern".to_string(),
                    json!("connection_pool_exhaustion"),
                )]),
            );
            LATENCY_ROOT_CAUSE.to_string()
        } else if symptom.contains("error") {
            ERROR_ROOT_CAUSE.to_string()
        } else {
            UNKNOWN_ROOT_CAUSE.to_string()
        }
    }

    /// Out-of-band injection point for findings from other agents. Not
    /// part of the linear phase sequence.
    pub fn receive_theory(&mut self, theory: Theory) {
        self.runtime.observe_with(
            format!("Received theory: {}", theory.description()),
            Metadata::from_iter([("source".to_string(), json!(theory.agent()))]),
        );
        self.theories.push(theory);
    }
}

/// Fixed area-to-specialist lookup. Unmapped areas go to the generalist.
fn specialist_for(area: &str) -> &'static str {
    match area {
        "metrics" | "logs" => "System Investigator",
        "recent_changes" | "git_history" => "Code Detective",
        _ => "General Investigator",
    }
}

#[async_trait]
impl Agent for IncidentCommander {
    fn runtime(&self) -> &AgentRuntime {
        &self.runtime
    }

    fn runtime_mut(&mut self) -> &mut AgentRuntime {
        &mut self.runtime
    }

    async fn run(&mut self, context: Value) -> Result<Value, AgentError> {
        let report = self.investigate(context).await?;
        Ok(serde_json::to_value(report).expect("report serialization is infallible"))
    }
}
