//! Reasoning client configuration.
//!
//! Backend-agnostic knobs for the chat-completion client. Credential
//! resolution fails fast at construction time; nothing degrades silently.

use crate::error::LlmError;

/// Default model: NVIDIA Nemotron with streamed reasoning content.
pub const DEFAULT_MODEL: &str = "nvidia/llama-3.3-nemotron-super-49b-v1.5";

/// Default endpoint: NVIDIA integrate API (OpenAI-compatible).
pub const DEFAULT_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";

/// System directive that switches the default backend into reasoning mode
/// when the caller supplied no system turn. A backend convention, not
/// policy: override or clear it per config.
pub const DEFAULT_THINKING_DIRECTIVE: &str = "/think";

const API_KEY_ENV_VARS: [&str; 2] = ["NVIDIA_API_KEY", "NGC_API_KEY"];

/// Configuration for the reasoning client.
#[derive(Debug, Clone)]
pub struct ReasoningClientConfig {
    /// Model ID to use for API calls.
    pub model: String,
    /// Base URL of the OpenAI-compatible endpoint.
    pub base_url: String,
    /// Explicit credential; falls back to NVIDIA_API_KEY / NGC_API_KEY.
    pub api_key: Option<String>,
    /// Lower bound on internal reasoning tokens.
    pub min_thinking_tokens: u32,
    /// Upper bound on internal reasoning tokens.
    pub max_thinking_tokens: u32,
    /// Synthetic system turn prepended when the messages carry none.
    /// `None` disables the injection entirely.
    pub thinking_directive: Option<String>,
}

impl Default for ReasoningClientConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            min_thinking_tokens: 512,
            max_thinking_tokens: 2048,
            thinking_directive: Some(DEFAULT_THINKING_DIRECTIVE.to_string()),
        }
    }
}

impl ReasoningClientConfig {
    /// The chat-completions URL for this config.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Resolve the credential: explicit key first, then environment.
    pub fn resolve_api_key(&self) -> Result<String, LlmError> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }
        for var in API_KEY_ENV_VARS {
            if let Ok(key) = std::env::var(var) {
                if !key.is_empty() {
                    return Ok(key);
                }
            }
        }
        Err(LlmError::Configuration(format!(
            "no API key found; set {} or {}",
            API_KEY_ENV_VARS[0], API_KEY_ENV_VARS[1]
        )))
    }

    /// Whether a credential is resolvable without constructing a client.
    pub fn has_credential(&self) -> bool {
        self.resolve_api_key().is_ok()
    }
}

/// Sampling options for a single call.
#[derive(Debug, Clone)]
pub struct CallOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    /// When off, the same reasoning/content partition is drawn from the
    /// single complete response object.
    pub stream: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            temperature: 0.6,
            top_p: 0.95,
            max_tokens: 2048,
            stream: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completions_url_handles_trailing_slash() {
        let config = ReasoningClientConfig {
            base_url: "https://example.test/v1/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.completions_url(),
            "https://example.test/v1/chat/completions"
        );
    }

    #[test]
    fn explicit_key_wins_over_environment() {
        let config = ReasoningClientConfig {
            api_key: Some("sk-explicit".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().unwrap(), "sk-explicit");
    }

    #[test]
    fn empty_explicit_key_is_not_a_credential() {
        let config = ReasoningClientConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        // Falls through to the environment; error only when that is unset too.
        if std::env::var("NVIDIA_API_KEY").is_err() && std::env::var("NGC_API_KEY").is_err() {
            assert!(matches!(
                config.resolve_api_key(),
                Err(LlmError::Configuration(_))
            ));
        }
    }

    #[test]
    fn call_options_defaults() {
        let options = CallOptions::default();
        assert_eq!(options.temperature, 0.6);
        assert_eq!(options.top_p, 0.95);
        assert_eq!(options.max_tokens, 2048);
        assert!(options.stream);
    }
}
