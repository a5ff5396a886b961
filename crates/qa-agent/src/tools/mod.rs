//! The tool contract and argument normalization (spec §4.3).

mod external;
mod registry;
mod think;

pub use external::ExternalTool;
pub use registry::ToolRegistry;
pub use think::ThinkTool;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::ToolError;
use crate::orchestrator::CancellationHandle;

/// A named, async-invocable tool. Tools are immutable at request scope and
/// must be safe for concurrent `invoke` calls (spec §5).
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn argument_schema(&self) -> JsonValue;

    /// Output is always UTF-8 text; structured results are serialized by
    /// the tool itself. `cancellation` propagates into the invocation so a
    /// long-running search can observe it directly.
    async fn invoke(
        &self,
        arguments: JsonValue,
        cancellation: CancellationHandle,
    ) -> Result<String, ToolError>;
}

/// Static metadata used to build the system prompt's tool list and the
/// LLM-facing `ToolSchema`s, without holding a reference to the tool itself.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub argument_schema: JsonValue,
}

/// Normalize LLM-supplied tool arguments (spec §4.3).
///
/// Arguments arrive as one of:
/// 1. A JSON object — used as-is.
/// 2. A string containing JSON — parsed, then used as-is if it's an object.
/// 3. A bare string — bound to the schema's sole required string field, if
///    there is exactly one.
///
/// Anything else is `ToolError::MalformedArguments`.
pub fn normalize_arguments(raw: &JsonValue, schema: &JsonValue) -> Result<JsonValue, ToolError> {
    match raw {
        JsonValue::Object(_) => Ok(raw.clone()),
        JsonValue::String(s) => {
            if let Ok(parsed @ JsonValue::Object(_)) = serde_json::from_str::<JsonValue>(s) {
                return Ok(parsed);
            }
            match sole_required_string_field(schema) {
                Some(field) => Ok(serde_json::json!({ field: s })),
                None => Err(ToolError::MalformedArguments(format!(
                    "expected a JSON object or a schema with exactly one required string field, got bare string {s:?}"
                ))),
            }
        }
        other => Err(ToolError::MalformedArguments(format!(
            "expected a JSON object or string, got {other}"
        ))),
    }
}

/// The schema's sole required field, if it's string-typed and there's
/// exactly one required field.
fn sole_required_string_field(schema: &JsonValue) -> Option<String> {
    let required = schema.get("required")?.as_array()?;
    if required.len() != 1 {
        return None;
    }
    let field = required[0].as_str()?;
    let field_type = schema.get("properties")?.get(field)?.get("type")?.as_str()?;
    if field_type == "string" {
        Some(field.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_field_schema() -> JsonValue {
        serde_json::json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        })
    }

    #[test]
    fn object_arguments_pass_through() {
        let raw = serde_json::json!({"query": "rust"});
        let out = normalize_arguments(&raw, &single_field_schema()).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn json_string_is_parsed() {
        let raw = JsonValue::String(r#"{"query":"rust"}"#.to_string());
        let out = normalize_arguments(&raw, &single_field_schema()).unwrap();
        assert_eq!(out, serde_json::json!({"query": "rust"}));
    }

    #[test]
    fn bare_string_binds_to_sole_required_field() {
        let raw = JsonValue::String("latest GPT-5".to_string());
        let out = normalize_arguments(&raw, &single_field_schema()).unwrap();
        assert_eq!(out, serde_json::json!({"query": "latest GPT-5"}));
    }

    #[test]
    fn bare_string_with_multi_field_schema_is_malformed() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "query": {"type": "string"}, "limit": {"type": "number"} },
            "required": ["query", "limit"]
        });
        let raw = JsonValue::String("latest GPT-5".to_string());
        let err = normalize_arguments(&raw, &schema).unwrap_err();
        assert_eq!(err.category(), "malformed_arguments");
    }

    #[test]
    fn non_string_non_object_is_malformed() {
        let raw = JsonValue::Number(5.into());
        let err = normalize_arguments(&raw, &single_field_schema()).unwrap_err();
        assert_eq!(err.category(), "malformed_arguments");
    }
}
