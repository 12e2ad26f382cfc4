//! edit_file tool - replace text in a file, or create it

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::tools::traits::string_arg;
use crate::tools::{Tool, ToolContext, ToolError, ToolResult};

/// Replace the first occurrence of `old_str`, or write the file when `old_str` is empty
pub struct EditFileTool;

impl EditFileTool {
    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let path = string_arg(input, "path", None)?;
        let old_str = string_arg(input, "old_str", Some(""))?;
        let new_str = string_arg(input, "new_str", Some(""))?;
        let full_path = ctx.validate_path(Path::new(path))?;
        let shown = full_path.display().to_string();

        if old_str.is_empty() {
            if let Some(parent) = full_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&full_path, new_str).await?;
            debug!(?full_path, "EditFileTool::run: wrote file");
            return Ok(serde_json::json!({ "path": shown, "action": format!("Created file {}", path) }));
        }

        if !full_path.exists() {
            return Ok(serde_json::json!({ "path": shown, "action": "path does not exist" }));
        }

        let original = tokio::fs::read_to_string(&full_path).await?;
        if !original.contains(old_str) {
            return Ok(serde_json::json!({ "path": shown, "action": "old_str not found" }));
        }

        let edited = original.replacen(old_str, new_str, 1);
        tokio::fs::write(&full_path, edited).await?;
        debug!(?full_path, "EditFileTool::run: replaced first occurrence");

        Ok(serde_json::json!({
            "path": shown,
            "action": "Edited: old_str replaced by new_str successfully",
        }))
    }
}

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &'static str {
        "edit_file"
    }

    fn description(&self) -> &'static str {
        "Replaces the first occurrence of old_str with new_str in a file. If old_str is empty, creates or overwrites the file with new_str."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The path to the file to edit"
                },
                "old_str": {
                    "type": "string",
                    "description": "The text to replace (empty to create the file)"
                },
                "new_str": {
                    "type": "string",
                    "description": "The replacement text"
                }
            },
            "required": ["path", "old_str", "new_str"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        debug!(?input, "EditFileTool::execute: called");
        self.run(&input, ctx).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_edit_replaces_first_occurrence_only() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), "foo bar foo").unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = EditFileTool
            .execute(
                serde_json::json!({"path": "a.txt", "old_str": "foo", "new_str": "baz"}),
                &ctx,
            )
            .await;

        assert!(!result.is_error);
        assert_eq!(fs::read_to_string(temp.path().join("a.txt")).unwrap(), "baz bar foo");
    }

    #[tokio::test]
    async fn test_empty_old_str_creates_file() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = EditFileTool
            .execute(
                serde_json::json!({"path": "new/hello.txt", "old_str": "", "new_str": "hi"}),
                &ctx,
            )
            .await;

        assert!(!result.is_error);
        assert!(result.json()["action"].as_str().unwrap().starts_with("Created file"));
        assert_eq!(fs::read_to_string(temp.path().join("new/hello.txt")).unwrap(), "hi");
    }

    #[tokio::test]
    async fn test_missing_file_reported() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = EditFileTool
            .execute(
                serde_json::json!({"path": "nope.txt", "old_str": "x", "new_str": "y"}),
                &ctx,
            )
            .await;

        assert!(!result.is_error);
        assert_eq!(result.json()["action"], "path does not exist");
    }

    #[tokio::test]
    async fn test_old_str_not_found_reported() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), "content").unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = EditFileTool
            .execute(
                serde_json::json!({"path": "a.txt", "old_str": "absent", "new_str": "y"}),
                &ctx,
            )
            .await;

        assert_eq!(result.json()["action"], "old_str not found");
        assert_eq!(fs::read_to_string(temp.path().join("a.txt")).unwrap(), "content");
    }
}
