use super::steps::AgentStep;
use serde_json::{json, Value};
use tracing::info;

/// Trace of one agent run.
///
/// The function-calling loop replays it to the model on every turn through
/// [`AgentMemory::as_messages`]; the ReAct loop only records into it and
/// hands the steps to [`RunResult`](super::RunResult) at the end.
#[derive(Debug, Clone, Default)]
pub struct AgentMemory {
    system_prompt: Option<String>,
    trace: Vec<AgentStep>,
}

impl AgentMemory {
    pub fn new(system_prompt: Option<String>) -> Self {
        Self {
            system_prompt,
            trace: Vec::new(),
        }
    }

    /// Append `step`, logging its one-line description under `sprout::steps`
    pub fn add_step(&mut self, step: AgentStep) {
        info!(target: "sprout::steps", "{}", step.describe());
        self.trace.push(step);
    }

    pub fn steps(&self) -> &[AgentStep] {
        &self.trace
    }

    pub fn into_steps(self) -> Vec<AgentStep> {
        self.trace
    }

    pub fn step_count(&self) -> usize {
        self.trace.len()
    }

    /// Chat messages for the next completion request: the system prompt, if
    /// any, then one message per step
    pub fn as_messages(&self) -> Vec<Value> {
        self.system_prompt
            .iter()
            .map(|prompt| json!({"role": "system", "content": prompt}))
            .chain(self.trace.iter().map(AgentStep::to_message))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_order_with_system_prompt() {
        let mut memory = AgentMemory::new(Some("Be brief.".to_string()));
        assert_eq!(memory.step_count(), 0);

        memory.add_step(AgentStep::Task {
            content: "Tell me a fact about seedlings.".to_string(),
        });
        memory.add_step(AgentStep::Feedback {
            message: "Call a tool.".to_string(),
        });

        let messages = memory.as_messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "Be brief.");
        assert_eq!(messages[1]["content"], "Tell me a fact about seedlings.");
        assert_eq!(messages[2]["role"], "user");
    }

    #[test]
    fn test_without_system_prompt() {
        let mut memory = AgentMemory::default();
        memory.add_step(AgentStep::Feedback {
            message: "try again".to_string(),
        });

        let messages = memory.as_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["content"], "try again");
        assert_eq!(memory.into_steps().len(), 1);
    }
}
