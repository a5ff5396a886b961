//! Immutable, request-scope registry of available tools (spec §4.3).
//!
//! Grounded in the teacher's `ToolRegistry` (construct-once, `HashMap<String,
//! Arc<dyn AgentTool>>`, registered at startup rather than as module-level
//! singletons — spec §9 "Pattern: global/lazy tool instances...").

use std::collections::HashMap;
use std::sync::Arc;

use crate::llm::ToolSchema;
use crate::tools::{think::ThinkTool, Tool, ToolDescriptor};

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// An empty registry plus the mandatory `think` tool (spec §4.3).
    pub fn new() -> Self {
        let mut registry = Self { tools: HashMap::new() };
        registry.register(Arc::new(ThinkTool));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .values()
            .map(|t| ToolDescriptor {
                name: t.name().to_string(),
                description: t.description().to_string(),
                argument_schema: t.argument_schema(),
            })
            .collect()
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .values()
            .map(|t| ToolSchema {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.argument_schema(),
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn think_is_registered_by_default() {
        let registry = ToolRegistry::new();
        assert!(registry.get("think").is_some());
    }

    #[test]
    fn unknown_tool_is_absent() {
        let registry = ToolRegistry::new();
        assert!(registry.get("web_search").is_none());
    }
}
