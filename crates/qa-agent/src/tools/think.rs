//! The mandatory `think` tool (spec §4.3): the identity function on its
//! `thought` argument. Its only purpose is to force the LLM to verbalize a
//! reasoning step; the orchestrator surfaces its calls as `Thought` events
//! rather than `Action`/`Observation` pairs.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::ToolError;
use crate::orchestrator::CancellationHandle;
use crate::tools::{normalize_arguments, Tool};

pub struct ThinkTool;

#[async_trait]
impl Tool for ThinkTool {
    fn name(&self) -> &str {
        "think"
    }

    fn description(&self) -> &str {
        "Record a reasoning step before taking any substantive action. Does not search or mutate anything."
    }

    fn argument_schema(&self) -> JsonValue {
        serde_json::json!({
            "type": "object",
            "properties": { "thought": { "type": "string" } },
            "required": ["thought"]
        })
    }

    async fn invoke(
        &self,
        arguments: JsonValue,
        _cancellation: CancellationHandle,
    ) -> Result<String, ToolError> {
        let normalized = normalize_arguments(&arguments, &self.argument_schema())?;
        let thought = normalized
            .get("thought")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| ToolError::MalformedArguments("missing `thought` field".into()))?;
        Ok(thought.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_its_thought() {
        let tool = ThinkTool;
        let out = tool
            .invoke(
                serde_json::json!({"thought": "I should search the web."}),
                CancellationHandle::new(),
            )
            .await
            .unwrap();
        assert_eq!(out, "I should search the web.");
    }

    #[tokio::test]
    async fn empty_thought_is_a_legal_zero_byte_observation() {
        let tool = ThinkTool;
        let out = tool
            .invoke(serde_json::json!({"thought": ""}), CancellationHandle::new())
            .await
            .unwrap();
        assert_eq!(out, "");
    }
}
