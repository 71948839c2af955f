use std::collections::BTreeMap;

/// A tool that can be executed by the agent
pub trait Tool: Send + Sync + std::fmt::Debug {
    /// The name of the tool (used in function calls)
    fn name(&self) -> &str;

    /// A description of what the tool does
    fn description(&self) -> &str;

    /// JSON Schema for the tool's parameters
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with given parameters
    fn execute(
        &self,
        parameters: serde_json::Value,
    ) -> std::pin::Pin<
        Box<
            dyn std::future::Future<Output = Result<serde_json::Value, crate::SproutError>>
                + Send
                + '_,
        >,
    >;
}

/// Registry for available tools, kept in name order so tool listings sent
/// to the model are stable
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    /// Get all registered tools
    pub fn list(&self) -> Vec<&dyn Tool> {
        self.tools.values().map(|tool| tool.as_ref()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Generate tool schemas for OpenAI function calling
    pub fn to_openai_tools(&self) -> Vec<serde_json::Value> {
        self.tools
            .values()
            .map(|tool| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.parameters_schema()
                    }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FnTool, SeedlingFactTool};

    #[test]
    fn test_registry_lists_in_name_order() {
        let mut registry = ToolRegistry::new();
        registry.register(SeedlingFactTool::new());
        registry.register(FnTool::new("echo", "Echo the input", |input| input));

        let tools = registry.list();
        let names: Vec<&str> = tools.iter().map(|tool| tool.name()).collect();
        assert_eq!(names, vec!["echo", "seedling_fact"]);
        assert_eq!(registry.to_openai_tools()[0]["function"]["name"], "echo");
    }

    #[test]
    fn test_registered_tool_executes() {
        let mut registry = ToolRegistry::new();
        registry.register(FnTool::new("echo", "Echo the input", |input| input));

        let tool = registry.get("echo").unwrap();
        let result =
            tokio_test::block_on(tool.execute(serde_json::json!({"input": "sprout"}))).unwrap();
        assert_eq!(result, serde_json::json!("sprout"));
        assert!(registry.get("missing").is_none());
    }
}
