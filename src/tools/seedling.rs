use super::Tool;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

pub const SEEDLING_FACT: &str = "Seedlings are young plants that have recently germinated.";

/// Parameters for the seedling fact tool
#[derive(Debug, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SeedlingFactParams {
    /// What the caller wants to know; the fact returned is the same either way
    #[serde(default)]
    pub question: Option<String>,
}

/// Returns a fixed fact about seedlings. Exists so the agent check has a
/// tool it can call without any external service.
#[derive(Debug)]
pub struct SeedlingFactTool;

impl Default for SeedlingFactTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedlingFactTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for SeedlingFactTool {
    fn name(&self) -> &str {
        "seedling_fact"
    }

    fn description(&self) -> &str {
        "Returns a simple fact about seedlings."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let mut schema = serde_json::to_value(schemars::schema_for!(SeedlingFactParams))
            .unwrap_or_else(|_| serde_json::json!({"type": "object"}));
        // Providers reject the draft marker and title inside function parameters.
        if let Some(object) = schema.as_object_mut() {
            object.remove("$schema");
            object.remove("title");
        }
        schema
    }

    fn execute(
        &self,
        parameters: serde_json::Value,
    ) -> Pin<
        Box<
            dyn std::future::Future<Output = Result<serde_json::Value, crate::SproutError>>
                + Send
                + '_,
        >,
    > {
        Box::pin(async move {
            let params: SeedlingFactParams = serde_path_to_error::deserialize(parameters)
                .map_err(|e| {
                    crate::SproutError::ToolExecution(format!(
                        "Invalid parameters at {}: {}",
                        e.path(),
                        e
                    ))
                })?;

            Ok(serde_json::json!({
                "fact": SEEDLING_FACT,
                "question": params.question
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_is_plain_object() {
        let schema = SeedlingFactTool::new().parameters_schema();
        assert_eq!(schema["type"], "object");
        assert!(schema.get("$schema").is_none());
        assert!(schema["properties"].get("question").is_some());
    }

    #[tokio::test]
    async fn test_returns_fact() {
        let result = SeedlingFactTool::new().execute(json!({})).await.unwrap();
        assert_eq!(result["fact"], SEEDLING_FACT);
        assert!(result["question"].is_null());
    }

    #[tokio::test]
    async fn test_bad_parameter_type_reports_path() {
        let err = SeedlingFactTool::new()
            .execute(json!({"question": 7}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("question"));
    }
}
