//! Warroom - incident response war room demo
//!
//! Drives an `IncidentCommander` against a canned latency-spike incident:
//! - observable agent reasoning as a live event feed
//! - LLM-powered root cause analysis when a credential is available
//! - rule-based fallback otherwise

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use warroom_core::{IncidentCommander, ReasoningClient, ReasoningClientConfig, ReasoningModel};

mod scenario;
mod visualizer;

use visualizer::{SimpleVisualizer, WarRoomVisualizer};

/// Warroom - Incident Response Demo
#[derive(Parser)]
#[command(name = "warroom")]
#[command(about = "Observable incident-investigation agents", long_about = None)]
struct Cli {
    /// One line per event instead of the full war-room view
    #[arg(long)]
    simple: bool,

    /// Skip the LLM even when a credential is available
    #[arg(long)]
    no_llm: bool,

    /// Model ID for the reasoning backend
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let incident = scenario::latency_spike();

    println!("\n{}", "=".repeat(80));
    println!("INCIDENT RESPONSE WAR ROOM - DEMO");
    println!("{}\n", "=".repeat(80));
    println!("INCIDENT DETECTED:");
    println!("  ID: {}", incident["id"].as_str().unwrap_or("unknown"));
    println!("  Symptom: {}", incident["symptom"].as_str().unwrap_or(""));
    println!(
        "  Severity: {}",
        incident["severity"].as_str().unwrap_or("").to_uppercase()
    );
    println!("  Service: {}", incident["service"].as_str().unwrap_or(""));
    println!("  Impact: {}", incident["impact"].as_str().unwrap_or(""));
    println!("\n{}\n", "-".repeat(80));

    // Attach an LLM only when a credential is resolvable; the demo driver
    // degrades to rule-based reasoning instead of failing the run.
    let llm: Option<Arc<dyn ReasoningModel>> = if cli.no_llm {
        None
    } else {
        let config = ReasoningClientConfig {
            model: cli
                .model
                .unwrap_or_else(|| ReasoningClientConfig::default().model),
            ..Default::default()
        };
        if config.has_credential() {
            println!("Initializing reasoning LLM ({})...\n", config.model);
            match ReasoningClient::new(config) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    println!("Failed to initialize LLM: {e}");
                    println!("Falling back to rule-based reasoning\n");
                    None
                }
            }
        } else {
            println!("No API key found - using rule-based reasoning\n");
            None
        }
    };

    let mut commander = IncidentCommander::new(llm);

    let war_room_viz = if cli.simple {
        commander.add_event_listener(Arc::new(SimpleVisualizer));
        None
    } else {
        let viz = Arc::new(WarRoomVisualizer::new());
        commander.add_event_listener(viz.clone());
        Some(viz)
    };

    println!("Starting incident response...\n");
    println!("{}\n", "=".repeat(80));

    let report = commander
        .investigate(serde_json::json!({ "incident": incident }))
        .await?;

    info!(status = %report.status, "investigation finished");

    println!("\n{}", "=".repeat(80));
    println!("INCIDENT RESPONSE COMPLETE");
    println!("{}\n", "=".repeat(80));
    println!("Status: {}", report.status);
    println!("Root Cause: {}\n", report.root_cause);

    if let Some(viz) = war_room_viz {
        viz.display_summary();
    }

    Ok(())
}
