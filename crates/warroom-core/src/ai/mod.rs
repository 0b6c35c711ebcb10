//! AI layer for Warroom
//!
//! Presents a uniform "ask the model, get back a labeled stream of
//! reasoning vs. answer text" interface, regardless of whether the
//! backend streams token-by-token or returns one shot.
//!
//! - `ReasoningModel` - pluggable capability trait agents depend on
//! - `ReasoningClient` - OpenAI-compatible HTTP client with
//!   reasoning-token support (NVIDIA Nemotron by default)
//! - `sse` - server-sent-event line buffering and delta parsing

pub mod client;
pub mod config;
pub mod model;
pub mod sse;
pub mod types;

pub use client::ReasoningClient;
pub use config::{CallOptions, ReasoningClientConfig};
pub use model::ReasoningModel;
pub use types::{ChatMessage, Role, StreamPart};
