use serde_json::{json, Value};

const ACTION_LABEL: &str = "Action:";
const ACTION_INPUT_LABEL: &str = "Action Input:";
const FINAL_ANSWER_LABEL: &str = "Final Answer:";
const THOUGHT_LABEL: &str = "Thought:";

/// One parsed model turn under the ReAct text protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReactOutput {
    Action {
        thought: Option<String>,
        tool: String,
        input: String,
    },
    FinalAnswer {
        thought: Option<String>,
        answer: String,
    },
}

/// Parse a ReAct reply. The error string is fed back to the model verbatim.
pub(crate) fn parse_react_output(text: &str) -> Result<ReactOutput, String> {
    let final_pos = text.find(FINAL_ANSWER_LABEL);
    let action_pos = text.find(ACTION_LABEL);

    match (final_pos, action_pos) {
        (Some(_), Some(_)) => Err(
            "Reply contains both an action and a final answer; give exactly one of them"
                .to_string(),
        ),
        (Some(pos), None) => {
            let answer = text[pos + FINAL_ANSWER_LABEL.len()..].trim();
            if answer.is_empty() {
                return Err("`Final Answer:` is empty".to_string());
            }
            Ok(ReactOutput::FinalAnswer {
                thought: thought_before(text, pos),
                answer: answer.to_string(),
            })
        }
        (None, Some(pos)) => {
            let rest = &text[pos + ACTION_LABEL.len()..];
            let input_pos = rest
                .find(ACTION_INPUT_LABEL)
                .ok_or_else(|| "Missing `Action Input:` after `Action:`".to_string())?;

            let tool = rest[..input_pos].trim().trim_matches('`').trim();
            if tool.is_empty() {
                return Err("`Action:` does not name a tool".to_string());
            }

            let input = rest[input_pos + ACTION_INPUT_LABEL.len()..]
                .split("\nObservation")
                .next()
                .unwrap_or_default()
                .trim()
                .trim_matches('"');

            Ok(ReactOutput::Action {
                thought: thought_before(text, pos),
                tool: tool.to_string(),
                input: input.to_string(),
            })
        }
        (None, None) => Err(
            "Reply has neither `Action:`/`Action Input:` nor `Final Answer:`".to_string(),
        ),
    }
}

fn thought_before(text: &str, pos: usize) -> Option<String> {
    let raw = text[..pos].trim();
    let thought = raw.strip_prefix(THOUGHT_LABEL).unwrap_or(raw).trim();
    (!thought.is_empty()).then(|| thought.to_string())
}

/// Tool arguments for a ReAct action input.
///
/// A tool whose schema takes a required `input` string always receives the
/// raw text, even when it looks like JSON. For other tools a JSON object is
/// passed through and anything else becomes `{"input": <text>}`.
pub(crate) fn react_arguments(input: &str, schema: Option<&Value>) -> Value {
    if schema.is_some_and(takes_text_input) {
        return json!({ "input": input });
    }
    match serde_json::from_str::<Value>(input) {
        Ok(Value::Object(map)) => Value::Object(map),
        _ => json!({ "input": input }),
    }
}

fn takes_text_input(schema: &Value) -> bool {
    let required = schema["required"]
        .as_array()
        .is_some_and(|required| required.iter().any(|name| name == "input"));
    required && schema["properties"]["input"]["type"] == "string"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action() {
        let text = " I should look this up.\nAction: seedling_fact\nAction Input: seedlings";
        assert_eq!(
            parse_react_output(text).unwrap(),
            ReactOutput::Action {
                thought: Some("I should look this up.".to_string()),
                tool: "seedling_fact".to_string(),
                input: "seedlings".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_action_stops_at_hallucinated_observation() {
        let text = "Action: `echo`\nAction Input: \"hi\"\nObservation: made up";
        match parse_react_output(text).unwrap() {
            ReactOutput::Action { tool, input, .. } => {
                assert_eq!(tool, "echo");
                assert_eq!(input, "hi");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_final_answer() {
        let text = "Thought: I now know the final answer\nFinal Answer: Seedlings are young plants.";
        assert_eq!(
            parse_react_output(text).unwrap(),
            ReactOutput::FinalAnswer {
                thought: Some("I now know the final answer".to_string()),
                answer: "Seedlings are young plants.".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_react_output("Just chatting").is_err());
        assert!(parse_react_output("Action: echo").is_err());
        assert!(parse_react_output("Action:\nAction Input: x").is_err());
        assert!(parse_react_output("Final Answer:   ").is_err());
        assert!(
            parse_react_output("Action: echo\nAction Input: x\nFinal Answer: y").is_err()
        );
    }

    #[test]
    fn test_react_arguments() {
        assert_eq!(react_arguments("plain", None), json!({"input": "plain"}));
        assert_eq!(
            react_arguments("{\"question\": \"why\"}", None),
            json!({"question": "why"})
        );
        assert_eq!(react_arguments("[1, 2]", None), json!({"input": "[1, 2]"}));
    }

    #[test]
    fn test_text_input_tool_gets_raw_json_text() {
        let schema = json!({
            "type": "object",
            "properties": {"input": {"type": "string"}},
            "required": ["input"]
        });
        let raw = "{\"question\": \"why\"}";

        assert_eq!(react_arguments(raw, Some(&schema)), json!({"input": raw}));

        let object_schema = json!({
            "type": "object",
            "properties": {"question": {"type": "string"}}
        });
        assert_eq!(
            react_arguments(raw, Some(&object_schema)),
            json!({"question": "why"})
        );
    }
}
