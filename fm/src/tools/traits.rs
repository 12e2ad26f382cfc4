//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::ToolError;
use super::context::ToolContext;

/// A tool the coordinator can call once the workers have picked it
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, also the action id workers nominate
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool
    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult;
}

/// Result of a tool execution
///
/// `content` is always a JSON document: the tool's payload on success,
/// `{"error": "..."}` on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful result from a JSON payload
    pub fn success(payload: Value) -> Self {
        debug!("ToolResult::success: called");
        Self {
            content: payload.to_string(),
            is_error: false,
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        debug!(%message, "ToolResult::error: called");
        Self {
            content: serde_json::json!({ "error": message }).to_string(),
            is_error: true,
        }
    }

    /// Parsed JSON content
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.content).unwrap_or_else(|_| Value::String(self.content.clone()))
    }
}

impl From<Result<Value, ToolError>> for ToolResult {
    fn from(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(payload) => ToolResult::success(payload),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

/// Fetch a string argument, falling back to `default` when absent
pub(crate) fn string_arg<'a>(input: &'a Value, key: &str, default: Option<&'a str>) -> Result<&'a str, ToolError> {
    match input.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Null) | None => default.ok_or_else(|| ToolError::InvalidArgument(format!("{} is required", key))),
        Some(other) => Err(ToolError::InvalidArgument(format!("{} must be a string, got {}", key, other))),
    }
}
