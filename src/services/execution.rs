use super::{
    prompts::{
        final_answer_tool_definition, react_system_prompt, react_user_prompt,
        EMPTY_REPLY_FEEDBACK, FINAL_ANSWER_TOOL, FUNCTION_CALLING_SYSTEM_PROMPT, REACT_STOP,
    },
    react::{parse_react_output, react_arguments, ReactOutput},
    tool_call_utils::{
        extract_arguments_str, extract_function_info, extract_tool_call_id,
        parse_function_arguments, value_to_text,
    },
};
use crate::{
    core::{
        agent::{Agent, AgentStrategy},
        chat::parse_chat_response,
        memory::AgentMemory,
        result::{accumulate_usage, RunResult, TokenUsage},
        steps::AgentStep,
    },
    error::{Result, SproutError},
};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, warn};

/// What a single model turn led to
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum TurnOutcome {
    Continue,
    Finished(String),
}

impl Agent {
    /// Run `instruction` and return the answer together with the full trace
    pub async fn run_with_steps(&self, instruction: &str) -> Result<RunResult> {
        match self.strategy() {
            AgentStrategy::FunctionCalling => self.run_function_calling(instruction).await,
            AgentStrategy::ZeroShotReact => self.run_react(instruction).await,
        }
    }

    async fn run_function_calling(&self, instruction: &str) -> Result<RunResult> {
        let start_time = Instant::now();
        let mut memory = AgentMemory::new(Some(FUNCTION_CALLING_SYSTEM_PROMPT.to_string()));
        memory.add_step(AgentStep::Task {
            content: instruction.to_string(),
        });

        let mut tools = self.function_factory().get_openai_tools();
        tools.push(final_answer_tool_definition());

        let mut tokens: Option<TokenUsage> = None;

        for iteration in 1..=self.max_iterations() {
            let request = self
                .llm()
                .request(memory.as_messages())
                .with_tools(tools.clone())
                .with_tool_choice(json!("auto"));

            let response = self.llm().send(request).await?;
            let reply = parse_chat_response(&response)?;
            accumulate_usage(&mut tokens, reply.usage);

            if let TurnOutcome::Finished(answer) =
                self.handle_assistant_message(&reply.message, &mut memory).await
            {
                return Ok(RunResult {
                    output: answer,
                    steps: memory.into_steps(),
                    tokens,
                    duration: start_time.elapsed(),
                    iterations: iteration,
                });
            }
        }

        Err(SproutError::MaxIterations(self.max_iterations()))
    }

    /// Apply one assistant message to `memory`: execute its tool calls, or
    /// take its text as the answer
    pub(crate) async fn handle_assistant_message(
        &self,
        message: &Value,
        memory: &mut AgentMemory,
    ) -> TurnOutcome {
        let tool_calls = message
            .get("tool_calls")
            .and_then(|value| value.as_array())
            .filter(|calls| !calls.is_empty());

        let Some(tool_calls) = tool_calls else {
            let answer = message
                .get("content")
                .and_then(|value| value.as_str())
                .unwrap_or("")
                .trim()
                .to_string();

            if answer.is_empty() {
                memory.add_step(AgentStep::Feedback {
                    message: EMPTY_REPLY_FEEDBACK.to_string(),
                });
                return TurnOutcome::Continue;
            }

            memory.add_step(AgentStep::FinalAnswer {
                answer: answer.clone(),
            });
            return TurnOutcome::Finished(answer);
        };

        let calls_final_answer = tool_calls.iter().any(|tool_call| {
            extract_function_info(tool_call)
                .and_then(|(_, name)| name)
                .is_some_and(|name| name == FINAL_ANSWER_TOOL)
        });

        if calls_final_answer && tool_calls.len() > 1 {
            memory.add_step(AgentStep::Feedback {
                message: format!(
                    "`{}` must be the only tool call in its turn.",
                    FINAL_ANSWER_TOOL
                ),
            });
            return TurnOutcome::Continue;
        }

        for tool_call in tool_calls {
            let tool_call_id = match extract_tool_call_id(tool_call) {
                "" => format!("call_{}", memory.step_count()),
                id => id.to_string(),
            };

            let Some((function, Some(function_name))) =
                extract_function_info(tool_call).filter(|(_, name)| {
                    name.as_deref().is_some_and(|name| !name.is_empty())
                })
            else {
                warn!(tool_call_id = %tool_call_id, "Tool call without a function name");
                memory.add_step(AgentStep::Feedback {
                    message: "A tool call was missing its function name; name the tool you want to call.".to_string(),
                });
                continue;
            };

            let arguments_str = extract_arguments_str(&function);
            let parsed_arguments = parse_function_arguments(arguments_str, &function_name);

            let arguments = match &parsed_arguments {
                Ok(arguments) => arguments.clone(),
                Err(_) => Value::String(arguments_str.to_string()),
            };
            memory.add_step(AgentStep::Action {
                tool_name: function_name.clone(),
                tool_call_id: tool_call_id.clone(),
                arguments,
            });

            let arguments = match parsed_arguments {
                Ok(arguments) => arguments,
                Err(error) => {
                    memory.add_step(AgentStep::Observation {
                        tool_call_id,
                        result: error.to_error_payload().to_string(),
                        is_error: true,
                    });
                    continue;
                }
            };

            if function_name == FINAL_ANSWER_TOOL {
                match arguments.get("answer").and_then(|value| value.as_str()) {
                    Some(answer) => {
                        let answer = answer.trim().to_string();
                        memory.add_step(AgentStep::FinalAnswer {
                            answer: answer.clone(),
                        });
                        return TurnOutcome::Finished(answer);
                    }
                    None => {
                        let error = SproutError::InvalidFunctionCall(format!(
                            "`{}` requires an `answer` string",
                            FINAL_ANSWER_TOOL
                        ));
                        memory.add_step(AgentStep::Observation {
                            tool_call_id,
                            result: error.to_error_payload().to_string(),
                            is_error: true,
                        });
                        continue;
                    }
                }
            }

            let (result, is_error) = self.execute_tool(&function_name, arguments).await;
            memory.add_step(AgentStep::Observation {
                tool_call_id,
                result,
                is_error,
            });
        }

        TurnOutcome::Continue
    }

    async fn run_react(&self, instruction: &str) -> Result<RunResult> {
        let start_time = Instant::now();
        let system_prompt = react_system_prompt(&self.function_factory().tools());

        // The trace is recorded in memory; the model sees the scratchpad.
        let mut memory = AgentMemory::new(None);
        memory.add_step(AgentStep::Task {
            content: instruction.to_string(),
        });
        let mut scratchpad = String::new();
        let mut tokens: Option<TokenUsage> = None;

        for iteration in 1..=self.max_iterations() {
            let messages = vec![
                json!({"role": "system", "content": system_prompt}),
                json!({"role": "user", "content": react_user_prompt(instruction, &scratchpad)}),
            ];
            let request = self.llm().request(messages).with_stop(REACT_STOP);

            let response = self.llm().send(request).await?;
            let reply = parse_chat_response(&response)?;
            accumulate_usage(&mut tokens, reply.usage);

            if let TurnOutcome::Finished(answer) = self
                .handle_react_output(&reply.content, &mut memory, &mut scratchpad, iteration)
                .await
            {
                return Ok(RunResult {
                    output: answer,
                    steps: memory.into_steps(),
                    tokens,
                    duration: start_time.elapsed(),
                    iterations: iteration,
                });
            }
        }

        Err(SproutError::MaxIterations(self.max_iterations()))
    }

    /// Apply one ReAct reply: run the named tool and extend the scratchpad,
    /// or finish on `Final Answer:`
    pub(crate) async fn handle_react_output(
        &self,
        text: &str,
        memory: &mut AgentMemory,
        scratchpad: &mut String,
        iteration: usize,
    ) -> TurnOutcome {
        let observation = match parse_react_output(text) {
            Ok(ReactOutput::FinalAnswer { thought, answer }) => {
                if let Some(text) = thought {
                    memory.add_step(AgentStep::Thought { text });
                }
                memory.add_step(AgentStep::FinalAnswer {
                    answer: answer.clone(),
                });
                return TurnOutcome::Finished(answer);
            }
            Ok(ReactOutput::Action {
                thought,
                tool,
                input,
            }) => {
                if let Some(text) = thought {
                    memory.add_step(AgentStep::Thought { text });
                }
                let tool_call_id = format!("react_{}", iteration);
                let schema = self.function_factory().parameters_schema(&tool);
                let arguments = react_arguments(&input, schema.as_ref());
                memory.add_step(AgentStep::Action {
                    tool_name: tool.clone(),
                    tool_call_id: tool_call_id.clone(),
                    arguments: arguments.clone(),
                });

                let (result, is_error) = self.execute_tool(&tool, arguments).await;
                memory.add_step(AgentStep::Observation {
                    tool_call_id,
                    result: result.clone(),
                    is_error,
                });
                result
            }
            Err(problem) => {
                let message = format!("Invalid format: {}.", problem);
                memory.add_step(AgentStep::Feedback {
                    message: message.clone(),
                });
                message
            }
        };

        scratchpad.push(' ');
        scratchpad.push_str(text.trim());
        scratchpad.push_str("\nObservation: ");
        scratchpad.push_str(&observation);
        scratchpad.push_str("\nThought:");

        TurnOutcome::Continue
    }

    /// Run a tool; failures become an error payload for the model to read
    async fn execute_tool(&self, name: &str, arguments: Value) -> (String, bool) {
        debug!(tool = %name, "Executing tool");
        match self
            .function_factory()
            .execute_function(name, arguments)
            .await
        {
            Ok(result) => (value_to_text(&result), false),
            Err(error) => {
                warn!(tool = %name, error = %error, "Tool call failed");
                (error.to_error_payload().to_string(), true)
            }
        }
    }
}
