use super::steps::AgentStep;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{ops::AddAssign, time::Duration};

/// Result of an agent execution run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Final output from the agent
    pub output: String,
    /// All steps taken during execution
    pub steps: Vec<AgentStep>,
    /// Total tokens used (if reported by the API)
    pub tokens: Option<TokenUsage>,
    /// Total execution duration
    pub duration: Duration,
    /// Number of model round-trips used
    pub iterations: usize,
}

/// Token usage information from the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Read the `usage` block of a completion response
    pub fn from_response(response: &Value) -> Option<Self> {
        let usage = response.get("usage")?;
        let field = |name: &str| {
            usage
                .get(name)
                .and_then(|value| value.as_u64())
                .map(|value| value as u32)
        };
        let prompt_tokens = field("prompt_tokens")?;
        let completion_tokens = field("completion_tokens").unwrap_or(0);
        Some(Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: field("total_tokens").unwrap_or(prompt_tokens + completion_tokens),
        })
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Fold one response's usage into a running total
pub(crate) fn accumulate_usage(total: &mut Option<TokenUsage>, usage: Option<TokenUsage>) {
    if let Some(usage) = usage {
        *total.get_or_insert_with(TokenUsage::default) += usage;
    }
}

impl RunResult {
    /// Generate a human-readable replay of the execution
    pub fn replay(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Agent Execution Trace ===".to_string());
        lines.push(format!("Duration: {:.2}s", self.duration.as_secs_f64()));
        lines.push(format!("Iterations: {}", self.iterations));

        if let Some(tokens) = &self.tokens {
            lines.push(format!(
                "Tokens: {} prompt + {} completion = {} total",
                tokens.prompt_tokens, tokens.completion_tokens, tokens.total_tokens
            ));
        }

        lines.push(String::new());
        lines.push("--- Steps ---".to_string());

        for (idx, step) in self.steps.iter().enumerate() {
            lines.push(format!("{}. {}", idx + 1, step.describe()));
        }

        lines.push(String::new());
        lines.push("--- Final Output ---".to_string());
        lines.push(self.output.clone());

        lines.join("\n")
    }

    /// Get count of actions (tool calls) executed
    pub fn action_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, AgentStep::Action { .. }))
            .count()
    }

    /// Get count of observations (tool results)
    pub fn observation_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, AgentStep::Observation { .. }))
            .count()
    }

    /// Get all error observations
    pub fn errors(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                AgentStep::Observation {
                    result, is_error, ..
                } if *is_error => Some(result.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result_with(steps: Vec<AgentStep>, tokens: Option<TokenUsage>) -> RunResult {
        RunResult {
            output: "Done".to_string(),
            steps,
            tokens,
            duration: Duration::from_secs(2),
            iterations: 1,
        }
    }

    #[test]
    fn test_replay_format() {
        let result = result_with(
            vec![
                AgentStep::Task {
                    content: "Test".to_string(),
                },
                AgentStep::FinalAnswer {
                    answer: "Done".to_string(),
                },
            ],
            Some(TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 50,
                total_tokens: 150,
            }),
        );

        let replay = result.replay();
        assert!(replay.contains("Duration"));
        assert!(replay.contains("Tokens: 100 prompt + 50 completion = 150 total"));
        assert!(replay.contains("Task"));
        assert!(replay.contains("Final Answer"));
    }

    #[test]
    fn test_error_tracking() {
        let result = result_with(
            vec![
                AgentStep::Observation {
                    tool_call_id: "1".to_string(),
                    result: "Error occurred".to_string(),
                    is_error: true,
                },
                AgentStep::Observation {
                    tool_call_id: "2".to_string(),
                    result: "Success".to_string(),
                    is_error: false,
                },
            ],
            None,
        );

        assert_eq!(result.observation_count(), 2);
        assert_eq!(result.errors(), vec!["Error occurred"]);
    }

    #[test]
    fn test_usage_accumulates() {
        let response = json!({"usage": {"prompt_tokens": 10, "completion_tokens": 5}});
        let mut total = None;
        accumulate_usage(&mut total, TokenUsage::from_response(&response));
        accumulate_usage(&mut total, TokenUsage::from_response(&response));
        accumulate_usage(&mut total, TokenUsage::from_response(&json!({})));

        assert_eq!(
            total,
            Some(TokenUsage {
                prompt_tokens: 20,
                completion_tokens: 10,
                total_tokens: 30,
            })
        );
    }
}
