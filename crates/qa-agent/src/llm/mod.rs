//! Provider-agnostic chat-completion with tool-binding and streaming
//! (spec §4.2).
//!
//! Concrete providers differ in whether chunk content is a raw string or a
//! structured list of content parts, and in how tool-call fragments are
//! framed on the wire. [`LLMClient::stream`] is the one seam where that
//! heterogeneity gets flattened into [`LLMChunk`] — no other component in
//! this crate ever sees a provider-specific shape.

mod openai_compatible;

pub use openai_compatible::OpenAiCompatibleClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::sync::mpsc;

use crate::config::RunConfig;
use crate::error::LLMError;
use crate::message::Message;

/// Schema describing a tool the LLM may call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: JsonValue,
}

/// Why an LLM turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end: the assistant produced a final answer.
    Stop,
    /// The model wants to invoke tools; no further text will come this step.
    ToolCalls,
    /// Hit `max_output_tokens`.
    Length,
    /// Provider content filter triggered.
    ContentFilter,
    /// The provider itself reported an error as a finish reason rather than
    /// failing the stream outright.
    Error,
}

/// One fragment of a single LLM turn's streamed output.
#[derive(Debug, Clone)]
pub enum LLMChunk {
    /// A possibly-empty text fragment of the assistant's content.
    TextDelta(String),
    /// An (id, name, partial-arguments-json) fragment of a tool call. The
    /// client is not required to assemble these into complete calls, only
    /// to surface the boundaries faithfully — assembly happens in
    /// `OpenAiCompatibleClient` itself since the wire format numbers tool
    /// calls by index across deltas; other providers may do less work here.
    ToolCallDelta {
        id: String,
        name: Option<String>,
        arguments_fragment: String,
    },
    /// Sentinel: exactly one per turn, always the last item before the
    /// stream closes.
    End(FinishReason),
}

/// A lazy, finite, non-restartable sequence of chunks for exactly one LLM
/// turn. Ends either with an `Err` (stream failed — transport, rate limit,
/// auth, malformed, filtered) or a final `Ok(LLMChunk::End(_))` item.
pub type LLMStream = mpsc::Receiver<Result<LLMChunk, LLMError>>;

/// Provider-agnostic chat completion.
///
/// Contract: one `stream` call is exactly one LLM turn. If it ends with
/// `FinishReason::ToolCalls`, the caller completes those tool calls and
/// re-invokes `stream` with the results appended to `messages`.
#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn stream(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        run_config: &RunConfig,
    ) -> Result<LLMStream, LLMError>;
}

/// Assembles `ToolCallDelta` fragments observed during one turn into
/// complete [`crate::message::ToolCall`] records, in first-seen order. Used
/// by [`crate::orchestrator`] rather than by individual clients, since the
/// spec leaves assembly as the caller's option (§4.2).
#[derive(Default)]
pub struct ToolCallAssembler {
    order: Vec<String>,
    names: std::collections::HashMap<String, String>,
    arguments: std::collections::HashMap<String, String>,
}

impl ToolCallAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: String, name: Option<String>, arguments_fragment: String) {
        if !self.names.contains_key(&id) {
            self.order.push(id.clone());
        }
        if let Some(name) = name {
            self.names.insert(id.clone(), name);
        }
        self.arguments
            .entry(id.clone())
            .or_default()
            .push_str(&arguments_fragment);
    }

    /// Finalize into `ToolCall`s, in the order ids were first observed.
    /// Arguments that fail to parse as JSON are carried as a JSON string so
    /// the tool registry's normalization (spec §4.3) can still bind them.
    pub fn finish(self) -> Vec<crate::message::ToolCall> {
        self.order
            .into_iter()
            .map(|id| {
                let raw = self.arguments.get(&id).cloned().unwrap_or_default();
                let arguments = serde_json::from_str(&raw)
                    .unwrap_or_else(|_| JsonValue::String(raw));
                crate::message::ToolCall {
                    id: id.clone(),
                    name: self.names.get(&id).cloned().unwrap_or_default(),
                    arguments,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_fragmented_arguments_in_order() {
        let mut a = ToolCallAssembler::new();
        a.push("1".into(), Some("web_search".into()), "{\"query\":".into());
        a.push("1".into(), None, "\"rust\"}".into());
        a.push("2".into(), Some("think".into()), "{\"thought\":\"ok\"}".into());
        let calls = a.finish();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "web_search");
        assert_eq!(calls[0].arguments, serde_json::json!({"query": "rust"}));
        assert_eq!(calls[1].name, "think");
    }

    #[test]
    fn unparseable_arguments_survive_as_a_string() {
        let mut a = ToolCallAssembler::new();
        a.push("1".into(), Some("web_search".into()), "latest GPT-5".into());
        let calls = a.finish();
        assert_eq!(calls[0].arguments, JsonValue::String("latest GPT-5".into()));
    }
}
