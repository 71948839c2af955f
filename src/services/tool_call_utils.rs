use crate::error::SproutError;
use serde_json::Value;

/// Extract tool_call_id from a tool call JSON object
pub(super) fn extract_tool_call_id(tool_call: &Value) -> &str {
    tool_call
        .get("id")
        .and_then(|value| value.as_str())
        .unwrap_or_default()
}

/// Extract function name from a tool call JSON object
pub(super) fn extract_function_info(tool_call: &Value) -> Option<(Value, Option<String>)> {
    let function = tool_call.get("function").cloned()?;
    let function_name = function
        .get("name")
        .and_then(|value| value.as_str())
        .map(|s| s.to_string());
    Some((function, function_name))
}

/// Parse function arguments from JSON string. An empty string means no
/// arguments.
pub(super) fn parse_function_arguments(
    arguments_str: &str,
    function_name: &str,
) -> Result<Value, SproutError> {
    if arguments_str.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(arguments_str).map_err(|err| {
        SproutError::InvalidFunctionCall(format!(
            "Failed to parse arguments for tool '{}': {}",
            function_name, err
        ))
    })
}

/// Extract arguments string from function object
pub(super) fn extract_arguments_str(function: &Value) -> &str {
    function
        .get("arguments")
        .and_then(|value| value.as_str())
        .unwrap_or("")
}

/// Render a tool result as message content
pub(super) fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_call_parts() {
        let call = json!({
            "id": "call_1",
            "type": "function",
            "function": {"name": "seedling_fact", "arguments": "{\"question\":\"q\"}"}
        });
        assert_eq!(extract_tool_call_id(&call), "call_1");

        let (function, name) = extract_function_info(&call).unwrap();
        assert_eq!(name.as_deref(), Some("seedling_fact"));
        let args = parse_function_arguments(extract_arguments_str(&function), "seedling_fact")
            .unwrap();
        assert_eq!(args["question"], "q");
    }

    #[test]
    fn test_empty_arguments_are_an_empty_object() {
        assert_eq!(parse_function_arguments("", "t").unwrap(), json!({}));
        assert!(parse_function_arguments("{oops", "t").is_err());
    }
}
