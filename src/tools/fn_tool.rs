use super::Tool;
use serde_json::Value;
use std::{fmt, pin::Pin, sync::Arc};

type ToolFn = Arc<dyn Fn(String) -> String + Send + Sync>;

/// A named callable exposed to the agent as a tool.
///
/// The callable takes one text input and returns text, which makes it usable
/// by both agent strategies: function calling passes `{"input": "..."}`, and
/// ReAct passes the raw `Action Input` line.
#[derive(Clone)]
pub struct FnTool {
    name: String,
    description: String,
    func: ToolFn,
}

impl FnTool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            func: Arc::new(func),
        }
    }
}

impl fmt::Debug for FnTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "input": {
                    "type": "string",
                    "description": "Input text for the tool"
                }
            },
            "required": ["input"]
        })
    }

    fn execute(
        &self,
        parameters: Value,
    ) -> Pin<
        Box<dyn std::future::Future<Output = Result<Value, crate::SproutError>> + Send + '_>,
    > {
        Box::pin(async move {
            let input = match parameters.get("input") {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            Ok(Value::String((self.func)(input)))
        })
    }
}
