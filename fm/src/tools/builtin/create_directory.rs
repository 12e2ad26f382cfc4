//! create_directory tool - create a directory and its parents

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::tools::traits::string_arg;
use crate::tools::{Tool, ToolContext, ToolError, ToolResult};

/// Create a directory, including missing parents
pub struct CreateDirectoryTool;

impl CreateDirectoryTool {
    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let path = string_arg(input, "path", None)?;
        let full_path = ctx.validate_path(Path::new(path))?;
        tokio::fs::create_dir_all(&full_path).await?;
        debug!(?full_path, "CreateDirectoryTool::run: created");

        Ok(serde_json::json!({
            "path": full_path.display().to_string(),
            "action": "Directory created successfully",
        }))
    }
}

#[async_trait]
impl Tool for CreateDirectoryTool {
    fn name(&self) -> &'static str {
        "create_directory"
    }

    fn description(&self) -> &'static str {
        "Creates a directory at the provided path. Missing parent directories are created automatically."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The directory path to create"
                }
            },
            "required": ["path"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        debug!(?input, "CreateDirectoryTool::execute: called");
        self.run(&input, ctx).await.into()
    }
}
