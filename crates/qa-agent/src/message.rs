//! The data model shared by the session store, the LLM client, and the
//! orchestrator (spec §3).

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A structured request from the LLM to invoke a named tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Fresh, unique per assistant turn.
    pub id: String,
    pub name: String,
    pub arguments: JsonValue,
}

/// A single turn in a conversation.
///
/// Invariant (enforced by the orchestrator, never by this type alone): every
/// `Assistant` message carrying `tool_calls` is followed, before the next
/// `Assistant` message, by exactly one `ToolResult` per call id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// Instruction text authored by the orchestrator. Always first.
    System { content: String },
    /// The raw question as submitted.
    User { content: String },
    /// The LLM's output. `content` and `tool_calls` may each be empty, but
    /// not both at once in a well-formed *terminal* assistant message —
    /// a turn that calls tools legitimately has `content: None`.
    Assistant {
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// The serialized output of one tool invocation.
    ToolResult {
        tool_call_id: String,
        content: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System { content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User { content: content.into() }
    }

    pub fn assistant_text(content: impl Into<String>) -> Self {
        Message::Assistant { content: Some(content.into()), tool_calls: Vec::new() }
    }

    pub fn assistant_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Message::Assistant { content: None, tool_calls }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Message::ToolResult { tool_call_id: tool_call_id.into(), content: content.into() }
    }

    /// Text content, if any (System/User always have it; Assistant may).
    pub fn text(&self) -> Option<&str> {
        match self {
            Message::System { content } | Message::User { content } => Some(content.as_str()),
            Message::Assistant { content, .. } => content.as_deref(),
            Message::ToolResult { content, .. } => Some(content.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_tool_calls_has_no_content() {
        let m = Message::assistant_tool_calls(vec![ToolCall {
            id: "1".into(),
            name: "think".into(),
            arguments: serde_json::json!({"thought": "x"}),
        }]);
        match m {
            Message::Assistant { content, tool_calls } => {
                assert!(content.is_none());
                assert_eq!(tool_calls.len(), 1);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn round_trips_through_json() {
        let m = Message::user("hello");
        let json = serde_json::to_string(&m).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.text(), Some("hello"));
    }
}
