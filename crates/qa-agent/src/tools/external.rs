//! Generic wrapper for tools that perform bounded external I/O (web search,
//! document search). The concrete backend — the HTTP call or vector lookup
//! itself — is out of scope for this crate (spec §1); what belongs here is
//! the contract every such tool must satisfy: bounded runtime, no mutation
//! of global state, text output (spec §4.3).
//!
//! Grounded in the teacher's `RAGSearchTool`, which wraps a
//! `SharedRAGEngine` injected at runtime rather than reaching for a
//! module-level singleton.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::ToolError;
use crate::orchestrator::CancellationHandle;
use crate::tools::{normalize_arguments, Tool};

/// The out-of-scope collaborator: performs the actual search/fetch.
#[async_trait]
pub trait ExternalBackend: Send + Sync {
    async fn call(&self, arguments: JsonValue) -> Result<String, ToolError>;
}

/// A tool whose execution is delegated to an [`ExternalBackend`] under a
/// fixed timeout, enforced here rather than trusted to the backend.
pub struct ExternalTool {
    name: String,
    description: String,
    schema: JsonValue,
    timeout: Duration,
    backend: Arc<dyn ExternalBackend>,
}

impl ExternalTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: JsonValue,
        timeout: Duration,
        backend: Arc<dyn ExternalBackend>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            timeout,
            backend,
        }
    }

    /// A single-string-argument `query` tool, named `web_search`.
    pub fn web_search(backend: Arc<dyn ExternalBackend>) -> Self {
        Self::new(
            "web_search",
            "Search the public web for up-to-date or time-sensitive information.",
            query_schema(),
            Duration::from_secs(15),
            backend,
        )
    }

    /// A single-string-argument `query` tool, named `rag_search`.
    pub fn rag_search(backend: Arc<dyn ExternalBackend>) -> Self {
        Self::new(
            "rag_search",
            "Search the internal document knowledge base for relevant passages.",
            query_schema(),
            Duration::from_secs(15),
            backend,
        )
    }
}

fn query_schema() -> JsonValue {
    serde_json::json!({
        "type": "object",
        "properties": { "query": { "type": "string" } },
        "required": ["query"]
    })
}

#[async_trait]
impl Tool for ExternalTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn argument_schema(&self) -> JsonValue {
        self.schema.clone()
    }

    async fn invoke(
        &self,
        arguments: JsonValue,
        cancellation: CancellationHandle,
    ) -> Result<String, ToolError> {
        let normalized = normalize_arguments(&arguments, &self.schema)?;
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(ToolError::Failed("cancelled".into())),
            result = tokio::time::timeout(self.timeout, self.backend.call(normalized)) => {
                match result {
                    Ok(inner) => inner,
                    Err(_) => Err(ToolError::Timeout(self.timeout.as_secs())),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoBackend;

    #[async_trait]
    impl ExternalBackend for EchoBackend {
        async fn call(&self, arguments: JsonValue) -> Result<String, ToolError> {
            Ok(format!("results for {}", arguments["query"]))
        }
    }

    struct HangingBackend;

    #[async_trait]
    impl ExternalBackend for HangingBackend {
        async fn call(&self, _arguments: JsonValue) -> Result<String, ToolError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("unreachable".into())
        }
    }

    #[tokio::test]
    async fn binds_bare_string_query_and_invokes_backend() {
        let tool = ExternalTool::web_search(Arc::new(EchoBackend));
        let out = tool
            .invoke(JsonValue::String("2024 AI trends".into()), CancellationHandle::new())
            .await
            .unwrap();
        assert!(out.contains("2024 AI trends"));
    }

    #[tokio::test]
    async fn times_out_a_hanging_backend() {
        let tool = ExternalTool::new(
            "slow_search",
            "search that never returns",
            query_schema(),
            Duration::from_millis(10),
            Arc::new(HangingBackend),
        );
        let err = tool
            .invoke(serde_json::json!({"query": "x"}), CancellationHandle::new())
            .await
            .unwrap_err();
        assert_eq!(err.category(), "timeout");
    }
}
