//! Terminal visualizers for agent activity.
//!
//! Listener implementations over the core event protocol: one verbose
//! war-room view with per-agent colors and an end-of-run summary, and a
//! one-line-per-event variant for quick demos. Listener calls are
//! synchronous and take `&self`, so collected state sits behind a mutex.

use std::collections::BTreeMap;
use std::sync::Mutex;

use warroom_core::{AgentEvent, EventKind, EventListener};

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[90m";

fn agent_color(agent: &str) -> &'static str {
    match agent {
        "Commander" => "\x1b[95m",
        "System Investigator" => "\x1b[94m",
        "Code Detective" => "\x1b[93m",
        "Root Cause Synthesizer" => "\x1b[92m",
        _ => RESET,
    }
}

fn kind_icon(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Thinking => "*",
        EventKind::Action => ">",
        EventKind::Observation => "o",
        EventKind::Theory => "?",
        EventKind::Challenge => "!",
        EventKind::Decision => "=",
    }
}

/// Metadata keys worth echoing under an event line.
const INTERESTING_KEYS: [&str; 4] = ["confidence", "tool", "priority", "severity"];

/// Full war-room view: colored live feed plus a post-run summary.
#[derive(Default)]
pub struct WarRoomVisualizer {
    events: Mutex<Vec<AgentEvent>>,
}

impl WarRoomVisualizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn display_event(event: &AgentEvent) {
        let color = agent_color(&event.agent_name);
        let timestamp = event.timestamp.format("%H:%M:%S");

        println!(
            "{color}[{timestamp}] {} [{}] {}{RESET}",
            kind_icon(event.kind),
            event.agent_name,
            event.kind.as_str().to_uppercase(),
        );
        println!("  {}", event.content);

        let interesting: Vec<String> = INTERESTING_KEYS
            .iter()
            .filter_map(|key| event.metadata.get(*key).map(|v| format!("{key}={v}")))
            .collect();
        if !interesting.is_empty() {
            println!("  {DIM}({}){RESET}", interesting.join(", "));
        }
        println!();
    }

    /// Per-agent event counts and the decision timeline.
    pub fn display_summary(&self) {
        let events = self.events.lock().unwrap();

        println!("\n{}", "=".repeat(80));
        println!("WAR ROOM SUMMARY");
        println!("{}\n", "=".repeat(80));

        let mut by_agent: BTreeMap<String, BTreeMap<&'static str, usize>> = BTreeMap::new();
        for event in events.iter() {
            *by_agent
                .entry(event.agent_name.clone())
                .or_default()
                .entry(event.kind.as_str())
                .or_default() += 1;
        }

        for (agent, counts) in &by_agent {
            println!("{}{}:{}", agent_color(agent), agent, RESET);
            for (kind, count) in counts {
                println!("  - {kind}: {count}");
            }
            println!();
        }

        println!("\nTIMELINE:");
        println!("{}", "-".repeat(80));
        for event in events.iter() {
            if event.kind == EventKind::Decision {
                println!(
                    "  {} | {}: {}",
                    event.timestamp.format("%H:%M:%S"),
                    event.agent_name,
                    event.content
                );
            }
        }
        println!();
    }
}

impl EventListener for WarRoomVisualizer {
    fn on_event(&self, event: &AgentEvent) {
        self.events.lock().unwrap().push(event.clone());
        Self::display_event(event);
    }
}

/// One line per event, no colors, no summary.
#[derive(Default)]
pub struct SimpleVisualizer;

impl EventListener for SimpleVisualizer {
    fn on_event(&self, event: &AgentEvent) {
        println!(
            "{} {} [{}] {}",
            event.timestamp.format("%H:%M:%S"),
            kind_icon(event.kind),
            event.agent_name,
            event.content
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warroom_core::agent::events::Metadata;

    #[test]
    fn visualizer_retains_events_in_order() {
        let viz = WarRoomVisualizer::new();
        viz.on_event(&AgentEvent::new(
            "Commander",
            EventKind::Thinking,
            "first",
            Metadata::new(),
        ));
        viz.on_event(&AgentEvent::new(
            "Commander",
            EventKind::Decision,
            "second",
            Metadata::new(),
        ));

        let events = viz.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].content, "first");
        assert_eq!(events[1].kind, EventKind::Decision);
    }
}
