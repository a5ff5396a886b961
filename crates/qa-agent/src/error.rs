//! Error taxonomy for the agent core.
//!
//! Every failure that can terminate a run is mapped to a stable `ErrorCategory`
//! (see [`crate::events::ErrorCategory`]) before it reaches the client. Tool
//! failures are the one exception — they never escape the orchestrator, they
//! become `ToolResult` bodies instead (see [`ToolError`]).

use thiserror::Error;

use crate::events::ErrorCategory;

/// Failure surfaced by a [`crate::session::SessionStore`] implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session store backend error: {0}")]
    Backend(String),
    #[error("session store is unavailable: {0}")]
    Unavailable(String),
}

/// Failure surfaced by an [`crate::llm::LLMClient`] implementation.
///
/// Carries a stable [`ErrorCategory`] so the orchestrator never has to guess
/// how to map a provider-specific error onto the wire taxonomy.
#[derive(Debug, Error)]
#[error("{category:?}: {message}")]
pub struct LLMError {
    pub category: ErrorCategory,
    pub message: String,
}

impl LLMError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Transport, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::RateLimit, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Auth, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Timeout, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Malformed, message)
    }

    pub fn filtered(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Filtered, message)
    }
}

/// Failure from a single tool invocation. Caught by the orchestrator and
/// converted into a `ToolResult` body — never surfaced to the client as an
/// `Error` event unless it indicates an orchestrator-side bug (unknown tool).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("malformed arguments: {0}")]
    MalformedArguments(String),
    #[error("timeout after {0}s")]
    Timeout(u64),
    #[error("{0}")]
    Failed(String),
}

impl ToolError {
    /// Category used in the `"[error: <category>: <message>]"` body fed back
    /// to the LLM (see spec §4.3).
    pub fn category(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_) => "unknown_tool",
            ToolError::MalformedArguments(_) => "malformed_arguments",
            ToolError::Timeout(_) => "timeout",
            ToolError::Failed(_) => "failed",
        }
    }

    /// Render as the stable error string fed back to the LLM as a ToolResult body.
    pub fn to_observation_text(&self) -> String {
        format!("[error: {}: {}]", self.category(), self)
    }

    /// True for errors that indicate a bug in the orchestrator itself (as
    /// opposed to a normal, LLM-recoverable tool failure) — these alone
    /// should surface as an `internal` Error event rather than a ToolResult.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ToolError::UnknownTool(_))
    }
}

/// Top-level error for a single agent run. Every variant maps onto exactly
/// one [`ErrorCategory`] for the terminal `Error` event.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LLMError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("recursion limit reached after {0} steps")]
    RecursionLimit(usize),
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl AgentError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AgentError::Llm(e) => e.category,
            AgentError::Storage(_) => ErrorCategory::Storage,
            AgentError::RecursionLimit(_) => ErrorCategory::RecursionLimit,
            AgentError::Internal(_) => ErrorCategory::Internal,
        }
    }
}
