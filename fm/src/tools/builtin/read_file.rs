//! read_file tool - return a file's full contents

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::tools::traits::string_arg;
use crate::tools::{Tool, ToolContext, ToolError, ToolResult};

/// Read the full content of a file
pub struct ReadFileTool;

impl ReadFileTool {
    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let filename = string_arg(input, "filename", None)?;
        let full_path = ctx.validate_path(Path::new(filename))?;
        let content = tokio::fs::read_to_string(&full_path).await?;
        debug!(?full_path, bytes = content.len(), "ReadFileTool::run: read file");

        Ok(serde_json::json!({
            "file_path": full_path.display().to_string(),
            "content": content,
        }))
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Gets the full content of a file provided by the user."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "The name of the file to read"
                }
            },
            "required": ["filename"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        debug!(?input, "ReadFileTool::execute: called");
        self.run(&input, ctx).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_read_file_basic() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("test.txt"), "line 1\nline 2").unwrap();

        let ctx = ToolContext::new(temp.path().to_path_buf());
        let result = ReadFileTool
            .execute(serde_json::json!({"filename": "test.txt"}), &ctx)
            .await;

        assert!(!result.is_error);
        let json = result.json();
        assert_eq!(json["content"], "line 1\nline 2");
        assert!(json["file_path"].as_str().unwrap().ends_with("test.txt"));
    }

    #[tokio::test]
    async fn test_read_file_not_found() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = ReadFileTool
            .execute(serde_json::json!({"filename": "missing.txt"}), &ctx)
            .await;

        assert!(result.is_error);
        assert!(result.json()["error"].is_string());
    }

    #[tokio::test]
    async fn test_read_file_requires_filename() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());
        let result = ReadFileTool.execute(serde_json::json!({}), &ctx).await;
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn test_read_file_outside_sandbox() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());
        let result = ReadFileTool
            .execute(serde_json::json!({"filename": "../outside.txt"}), &ctx)
            .await;
        assert!(result.is_error);
    }
}
