use crate::tools::Tool;
use serde_json::{json, Value};

pub(crate) const FINAL_ANSWER_TOOL: &str = "final_answer";

pub(crate) const FUNCTION_CALLING_SYSTEM_PROMPT: &str = "You are a helpful assistant with access to tools. Use tools when they help you answer accurately. Be concise. When you are ready to give the final response, call the `final_answer` tool with an `answer` string.";

pub(crate) const EMPTY_REPLY_FEEDBACK: &str =
    "Your reply was empty. Call one of the tools, or call `final_answer` with your answer.";

pub(crate) const REACT_STOP: &str = "\nObservation:";

/// Tool definition the model calls to finish a function-calling run
pub(crate) fn final_answer_tool_definition() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": FINAL_ANSWER_TOOL,
            "description": "Signal that the task is complete by providing the final answer.",
            "parameters": {
                "type": "object",
                "properties": {
                    "answer": {
                        "type": "string",
                        "description": "Final response for the user"
                    }
                },
                "required": ["answer"]
            }
        }
    })
}

/// System prompt for the zero-shot ReAct strategy: lists every tool with its
/// description and fixes the Thought/Action/Observation format
pub(crate) fn react_system_prompt(tools: &[&dyn Tool]) -> String {
    let tool_lines = if tools.is_empty() {
        "(no tools available)".to_string()
    } else {
        tools
            .iter()
            .map(|tool| format!("{}: {}", tool.name(), tool.description()))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let tool_names = tools
        .iter()
        .map(|tool| tool.name())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Answer the following question as best you can. You have access to the following tools:\n\n\
         {tool_lines}\n\n\
         Use the following format:\n\n\
         Question: the input question you must answer\n\
         Thought: think about what to do next\n\
         Action: the action to take, one of [{tool_names}]\n\
         Action Input: the input to the action\n\
         Observation: the result of the action\n\
         ... (Thought/Action/Action Input/Observation can repeat)\n\
         Thought: I now know the final answer\n\
         Final Answer: the final answer to the original question\n\n\
         Begin!"
    )
}

/// User turn for the ReAct strategy: the question followed by the running
/// scratchpad of earlier actions and observations
pub(crate) fn react_user_prompt(question: &str, scratchpad: &str) -> String {
    format!("Question: {}\nThought:{}", question, scratchpad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FnTool, SeedlingFactTool};

    #[test]
    fn test_react_prompt_lists_tools() {
        let seedling = SeedlingFactTool::new();
        let echo = FnTool::new("echo", "Repeat the input", |input: String| input);
        let tools: Vec<&dyn Tool> = vec![&seedling, &echo];
        let prompt = react_system_prompt(&tools);

        assert!(prompt.contains("seedling_fact: Returns a simple fact about seedlings."));
        assert!(prompt.contains("one of [seedling_fact, echo]"));
        assert!(prompt.contains("Final Answer:"));
    }

    #[test]
    fn test_react_user_prompt() {
        assert_eq!(react_user_prompt("Why?", ""), "Question: Why?\nThought:");
    }
}
