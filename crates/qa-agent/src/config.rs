//! Run-scoped and process-scoped configuration.
//!
//! `RunConfig` is per-request (spec §3). `ServiceConfig` reads the four
//! environment variables the core itself consumes (spec §6) — everything
//! else (API keys, endpoints) belongs to the `LLMClient`/`Tool` implementations.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::orchestrator::CancellationHandle;

/// Per-request parameters (spec §3 "RunConfig").
#[derive(Clone)]
pub struct RunConfig {
    /// Caps LLM_STEP ↔ TOOL_DISPATCH cycles. A step is counted each time an
    /// LLM_STEP completes (spec §4.5).
    pub max_steps: usize,
    /// Upper bound on LLM output tokens for a single step.
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Provider-specific model identifier; `None` defers to the provider's default.
    pub model: Option<String>,
    /// Deadline applied to the whole request, if any; caps every LLM stream
    /// and tool invocation beneath it (spec §5).
    pub request_deadline: Option<Duration>,
    pub cancellation: CancellationHandle,
}

impl RunConfig {
    pub fn new(cancellation: CancellationHandle) -> Self {
        Self {
            max_steps: 10,
            max_output_tokens: 4096,
            temperature: 0.7,
            model: None,
            request_deadline: None,
            cancellation,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// The four environment variables the core itself reads (spec §6). Loaded
/// once at process start and threaded through; not reloaded per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// `LLM_PROVIDER` — interpreted only by the concrete `LLMClient`.
    pub llm_provider: String,
    /// `RESPONSE_LANGUAGE` — fed into prompt composition.
    pub response_language: String,
    /// `AGENT_PERSONA` — fed into prompt composition.
    pub agent_persona: String,
    /// `AGENT_DESCRIPTION` — fed into prompt composition.
    pub agent_description: String,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self {
            llm_provider: std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string()),
            response_language: std::env::var("RESPONSE_LANGUAGE")
                .unwrap_or_else(|_| "English".to_string()),
            agent_persona: std::env::var("AGENT_PERSONA")
                .unwrap_or_else(|_| "a precise, helpful research assistant".to_string()),
            agent_description: std::env::var("AGENT_DESCRIPTION").unwrap_or_else(|_| {
                "Answers questions by reasoning step by step and consulting tools when needed."
                    .to_string()
            }),
        }
    }

    /// Reject configurations that would make prompt composition nonsensical.
    pub fn validate(&self) -> Result<(), String> {
        if self.response_language.trim().is_empty() {
            return Err("RESPONSE_LANGUAGE must not be empty".into());
        }
        if self.agent_persona.trim().is_empty() {
            return Err("AGENT_PERSONA must not be empty".into());
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_non_empty() {
        // SAFETY: single-threaded test, no other test mutates these vars.
        unsafe {
            std::env::remove_var("LLM_PROVIDER");
            std::env::remove_var("RESPONSE_LANGUAGE");
            std::env::remove_var("AGENT_PERSONA");
            std::env::remove_var("AGENT_DESCRIPTION");
        }
        let cfg = ServiceConfig::from_env();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.llm_provider, "openai");
    }
}
