//! The tagged event stream surfaced by the orchestrator (spec §4.6).
//!
//! One `run()` call emits a lazy, finite sequence of these, terminating in
//! exactly one of `Done` (normal or error-then-done) or, on cancellation, no
//! terminal event at all. The HTTP/SSE framing that maps each variant onto a
//! wire frame lives outside this crate; `event:` name ↔ variant name is a 1:1
//! mapping by design so that boundary stays a thin `match`.

use serde::Serialize;
use serde_json::Value as JsonValue;

/// Stable categorical code for an `Error` event (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Transport,
    RateLimit,
    Auth,
    Timeout,
    Malformed,
    Filtered,
    RecursionLimit,
    Storage,
    Cancelled,
    Internal,
}

/// A single event in a run's stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum AgentEvent {
    /// The `think` tool was invoked; `text` is its `thought` argument.
    Thought { text: String },
    /// A non-`think` tool was invoked, before its result is known.
    Action {
        tool: String,
        arguments: JsonValue,
    },
    /// The result of a tool invocation (including `think`'s echoed thought).
    Observation { tool: String, text: String },
    /// A fragment of the final assistant answer.
    Token { text: String },
    /// A terminal, non-recoverable failure. Always followed by `Done`,
    /// except the `cancelled` category, which never reaches the client.
    Error { category: ErrorCategory, detail: String },
    /// The run is over. Always the last event, unless cancelled.
    Done { session_id: String },
}
