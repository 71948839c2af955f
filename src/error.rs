use thiserror::Error;

/// Main error type for the smoke checks
#[derive(Error, Debug)]
pub enum SproutError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid function call: {0}")]
    InvalidFunctionCall(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Maximum iterations exceeded: {0}")]
    MaxIterations(usize),

    #[error("Rate limit exceeded: retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SproutError>;

impl SproutError {
    /// Whether a caller could reasonably try the same call again.
    /// Nothing in this crate retries; the flag is informational.
    pub fn is_retryable(&self) -> bool {
        match self {
            SproutError::Api { status, .. } => *status >= 500,
            SproutError::Http(err) => err.is_timeout() || err.is_connect(),
            SproutError::Validation(_) => true,
            SproutError::RateLimit { .. } => true,
            SproutError::Timeout(_) => true,
            _ => false,
        }
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            SproutError::Config(_) => "CONFIG_ERROR",
            SproutError::Http(_) => "HTTP_ERROR",
            SproutError::Api { .. } => "API_ERROR",
            SproutError::Serialization(_) => "SERIALIZATION_ERROR",
            SproutError::Validation(_) => "VALIDATION_ERROR",
            SproutError::ToolExecution(_) => "TOOL_EXECUTION_ERROR",
            SproutError::ToolNotFound(_) => "TOOL_NOT_FOUND",
            SproutError::InvalidFunctionCall(_) => "INVALID_FUNCTION_CALL",
            SproutError::Timeout(_) => "TIMEOUT_ERROR",
            SproutError::MaxIterations(_) => "MAX_ITERATIONS_EXCEEDED",
            SproutError::RateLimit { .. } => "RATE_LIMIT_ERROR",
            SproutError::VectorStore(_) => "VECTOR_STORE_ERROR",
            SproutError::UnexpectedResponse(_) => "UNEXPECTED_RESPONSE",
        }
    }

    /// Convert to a structured error payload, as fed back to the model
    /// when a tool call fails
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_retryable_only_for_server_errors() {
        let client_side = SproutError::Api {
            status: 401,
            message: "bad key".to_string(),
        };
        let server_side = SproutError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(!client_side.is_retryable());
        assert!(server_side.is_retryable());
        assert!(client_side.to_string().contains("401"));
    }
}
