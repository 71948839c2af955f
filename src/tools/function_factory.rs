use super::{tool::ToolRegistry, Tool};
use crate::{Result, SproutError};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

const MAX_SCHEMA_ERRORS: usize = 3;

/// Factory for creating and managing function/tool execution
#[derive(Debug)]
pub struct FunctionFactory {
    registry: ToolRegistry,
}

impl FunctionFactory {
    /// Create a new function factory
    pub fn new() -> Self {
        Self {
            registry: ToolRegistry::new(),
        }
    }

    /// Register a tool with the factory
    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) {
        self.registry.register(tool);
    }

    /// Builder-style [`FunctionFactory::register_tool`]
    pub fn with_tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.register_tool(tool);
        self
    }

    /// Execute a function call by name after checking `parameters` against
    /// the tool's schema
    pub async fn execute_function(&self, function_name: &str, parameters: Value) -> Result<Value> {
        let tool = self
            .registry
            .get(function_name)
            .ok_or_else(|| SproutError::ToolNotFound(function_name.to_string()))?;

        validate_arguments(tool, &parameters)?;
        tool.execute(parameters).await
    }

    /// Get all available tools for OpenAI function calling
    pub fn get_openai_tools(&self) -> Vec<Value> {
        self.registry.to_openai_tools()
    }

    /// Parameter schema of the named tool, if registered
    pub fn parameters_schema(&self, name: &str) -> Option<Value> {
        self.registry.get(name).map(|tool| tool.parameters_schema())
    }

    /// Check if a function exists
    pub fn has_function(&self, name: &str) -> bool {
        self.registry.get(name).is_some()
    }

    pub fn tools(&self) -> Vec<&dyn Tool> {
        self.registry.list()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl Default for FunctionFactory {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_arguments(tool: &dyn Tool, arguments: &Value) -> Result<()> {
    let schema = tool.parameters_schema();
    let validator = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema)
        .map_err(|err| {
            SproutError::Validation(format!(
                "Tool `{}` has an invalid parameter schema: {}",
                tool.name(),
                err
            ))
        })?;

    if let Err(errors) = validator.validate(arguments) {
        let mut details = Vec::new();
        let mut truncated = false;

        for (idx, error) in errors.enumerate() {
            if idx < MAX_SCHEMA_ERRORS {
                let mut path = error.instance_path.to_string();
                if path.is_empty() {
                    path = "<root>".to_string();
                }
                details.push(format!("{}: {}", path, error));
            } else {
                truncated = true;
                break;
            }
        }

        let mut detail_str = if details.is_empty() {
            "arguments failed schema validation".to_string()
        } else {
            details.join("; ")
        };

        if truncated {
            detail_str.push_str("; additional errors truncated");
        }

        return Err(SproutError::Validation(format!(
            "Arguments for `{}` do not match its schema: {}",
            tool.name(),
            detail_str
        )));
    }

    Ok(())
}
