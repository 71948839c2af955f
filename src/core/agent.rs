use crate::{
    core::chat::ChatModel,
    error::{Result, SproutError},
    tools::FunctionFactory,
};
use std::{fmt, str::FromStr};

/// How the agent drives the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentStrategy {
    /// Native tool calls; the run ends when the model calls `final_answer`
    /// or replies with plain text
    #[default]
    FunctionCalling,
    /// Text protocol (`Thought` / `Action` / `Action Input` / `Observation`
    /// / `Final Answer`) with tool descriptions in the prompt
    ZeroShotReact,
}

impl fmt::Display for AgentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentStrategy::FunctionCalling => f.write_str("function-calling"),
            AgentStrategy::ZeroShotReact => f.write_str("zero-shot-react"),
        }
    }
}

impl FromStr for AgentStrategy {
    type Err = SproutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tools" | "function-calling" | "openai-functions" => Ok(AgentStrategy::FunctionCalling),
            "react" | "zero-shot-react" | "zero-shot-react-description" => {
                Ok(AgentStrategy::ZeroShotReact)
            }
            other => Err(SproutError::Config(format!(
                "Unknown agent strategy '{}'; expected tools or react",
                other
            ))),
        }
    }
}

/// Tool-using agent over a [`ChatModel`]
#[derive(Debug)]
pub struct Agent {
    llm: ChatModel,
    function_factory: FunctionFactory,
    strategy: AgentStrategy,
    max_iterations: usize,
}

impl Agent {
    /// Assemble an agent from its tools, model and strategy
    pub fn initialize(tools: FunctionFactory, llm: ChatModel, strategy: AgentStrategy) -> Self {
        Self {
            llm,
            function_factory: tools,
            strategy,
            max_iterations: 10,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn strategy(&self) -> AgentStrategy {
        self.strategy
    }

    pub(crate) fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub(crate) fn function_factory(&self) -> &FunctionFactory {
        &self.function_factory
    }

    pub(crate) fn llm(&self) -> &ChatModel {
        &self.llm
    }

    /// Run `instruction` to completion and return the final answer text
    pub async fn run(&self, instruction: &str) -> Result<String> {
        Ok(self.run_with_steps(instruction).await?.output)
    }
}
