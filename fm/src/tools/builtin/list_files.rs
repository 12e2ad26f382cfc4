//! list_files tool - list the entries of a directory

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::tools::traits::string_arg;
use crate::tools::{Tool, ToolContext, ToolError, ToolResult};

/// List files and directories in a path
pub struct ListFilesTool;

impl ListFilesTool {
    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let path = string_arg(input, "path", Some("."))?;
        let full_path = ctx.validate_path(Path::new(path))?;

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&full_path).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let kind = match entry.file_type().await {
                Ok(t) if t.is_file() => "file",
                Ok(_) => "dir",
                Err(_) => {
                    debug!(%name, "ListFilesTool::run: failed to get file type, skipping entry");
                    continue;
                }
            };
            entries.push((name, kind));
        }
        entries.sort();
        debug!(count = entries.len(), "ListFilesTool::run: entries collected");

        let files: Vec<Value> = entries
            .into_iter()
            .map(|(name, kind)| serde_json::json!({ "filename": name, "type": kind }))
            .collect();

        Ok(serde_json::json!({
            "path": full_path.display().to_string(),
            "files": files,
        }))
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &'static str {
        "list_files"
    }

    fn description(&self) -> &'static str {
        "Lists the files in a directory provided by the user."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The path to a directory to list files from (default: .)"
                }
            },
            "required": ["path"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        debug!(?input, "ListFilesTool::execute: called");
        self.run(&input, ctx).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_list_files_basic() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("b.txt"), "").unwrap();
        fs::write(temp.path().join("a.txt"), "").unwrap();
        fs::create_dir(temp.path().join("subdir")).unwrap();

        let ctx = ToolContext::new(temp.path().to_path_buf());
        let result = ListFilesTool.execute(serde_json::json!({"path": "."}), &ctx).await;

        assert!(!result.is_error);
        let files = result.json()["files"].as_array().unwrap().clone();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0]["filename"], "a.txt");
        assert_eq!(files[0]["type"], "file");
        assert_eq!(files[2]["filename"], "subdir");
        assert_eq!(files[2]["type"], "dir");
    }

    #[tokio::test]
    async fn test_list_files_defaults_to_root() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("only.txt"), "").unwrap();

        let ctx = ToolContext::new(temp.path().to_path_buf());
        let result = ListFilesTool.execute(serde_json::json!({}), &ctx).await;

        assert!(!result.is_error);
        assert_eq!(result.json()["files"][0]["filename"], "only.txt");
    }

    #[tokio::test]
    async fn test_list_files_missing_directory() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());
        let result = ListFilesTool
            .execute(serde_json::json!({"path": "nope"}), &ctx)
            .await;
        assert!(result.is_error);
    }
}
