// Tool trait and registry

use crate::protocol::{CallToolResult, ToolSchema};
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments.
    ///
    /// Errors returned here are protocol-level failures (bad arguments and
    /// the like). Failures of the work itself belong in a `CallToolResult`
    /// with `is_error` set.
    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult>;
}

/// Tool registry for managing available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let schema = tool.schema();
        self.tools.insert(schema.name, tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all tool schemas, sorted by name
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: serde_json::Value, required: Vec<&str>) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_enum(values: &[&str], default: Option<&str>, description: &str) -> serde_json::Value {
    let mut schema = serde_json::json!({
        "type": "string",
        "enum": values,
        "description": description
    });
    if let Some(default) = default {
        schema["default"] = default.into();
    }
    schema
}

pub fn json_schema_integer(default: Option<i64>, description: &str) -> serde_json::Value {
    let mut schema = serde_json::json!({
        "type": ["integer", "string"],
        "description": description
    });
    if let Some(default) = default {
        schema["default"] = default.into();
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool(&'static str);

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.0.to_string(),
                description: "echo".to_string(),
                input_schema: json_schema_object(serde_json::json!({}), vec![]),
            }
        }

        async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
            Ok(CallToolResult::text(arguments.to_string()))
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(EchoTool("zeta")));
        registry.register(Arc::new(EchoTool("alpha")));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("alpha"));
        assert!(registry.get("missing").is_none());

        let names: Vec<_> = registry.list_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_schema_helpers() {
        let sort = json_schema_enum(&["asc", "desc"], Some("asc"), "Sort order");
        assert_eq!(sort["enum"], serde_json::json!(["asc", "desc"]));
        assert_eq!(sort["default"], "asc");

        let freq = json_schema_enum(&["d", "w"], None, "Frequency");
        assert!(freq.get("default").is_none());

        let limit = json_schema_integer(Some(10), "Limit");
        assert_eq!(limit["default"], 10);
    }
}
