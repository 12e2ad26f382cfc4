//! ToolExecutor - the registry of callable tools

use std::collections::BTreeMap;

use tracing::debug;

use crate::llm::{ToolCall, ToolDefinition};

use super::builtin::{CreateDirectoryTool, EditFileTool, ListFilesTool, ReadFileTool};
use super::{Tool, ToolContext, ToolError, ToolResult};

/// Tools by name, iterated in name order
pub struct ToolExecutor {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolExecutor {
    /// Create executor with the built-in file tools
    pub fn standard() -> Self {
        let mut executor = Self::empty();
        executor.add_tool(Box::new(ReadFileTool));
        executor.add_tool(Box::new(ListFilesTool));
        executor.add_tool(Box::new(EditFileTool));
        executor.add_tool(Box::new(CreateDirectoryTool));
        executor
    }

    /// Create an empty executor
    pub fn empty() -> Self {
        Self { tools: BTreeMap::new() }
    }

    /// Add a tool to the executor
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    fn definition(tool: &dyn Tool) -> ToolDefinition {
        ToolDefinition::new(tool.name(), tool.description(), tool.input_schema())
    }

    /// Get tool definitions for LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| Self::definition(t.as_ref())).collect()
    }

    /// Get definitions for a subset of tools by name
    pub fn definitions_for(&self, tool_names: &[&str]) -> Vec<ToolDefinition> {
        tool_names
            .iter()
            .filter_map(|name| self.tools.get(*name))
            .map(|t| Self::definition(t.as_ref()))
            .collect()
    }

    /// Execute a tool call
    pub async fn execute(&self, tool_call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        debug!(name = %tool_call.name, "ToolExecutor::execute: called");
        match self.tools.get(&tool_call.name) {
            Some(tool) => tool.execute(tool_call.input.clone(), ctx).await,
            None => ToolResult::error(
                ToolError::UnknownTool {
                    name: tool_call.name.clone(),
                }
                .to_string(),
            ),
        }
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get tool names in name order
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_standard_executor_has_file_tools() {
        let executor = ToolExecutor::standard();

        assert!(executor.has_tool("read_file"));
        assert!(executor.has_tool("list_files"));
        assert!(executor.has_tool("edit_file"));
        assert!(executor.has_tool("create_directory"));
        assert!(!executor.has_tool("no_tool"));
    }

    #[test]
    fn test_tool_names_are_sorted() {
        let names = ToolExecutor::standard().tool_names();
        assert_eq!(names, vec!["create_directory", "edit_file", "list_files", "read_file"]);
    }

    #[test]
    fn test_definitions_for_subset() {
        let executor = ToolExecutor::standard();
        let defs = executor.definitions_for(&["read_file", "missing"]);

        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "read_file");
        assert_eq!(executor.definitions().len(), 4);
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let executor = ToolExecutor::standard();
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let call = ToolCall {
            id: "call_1".to_string(),
            name: "unknown_tool".to_string(),
            input: serde_json::json!({}),
        };

        let result = executor.execute(&call, &ctx).await;
        assert!(result.is_error);
        assert!(result.content.contains("Tool not found"));
    }

    #[tokio::test]
    async fn test_execute_dispatches_by_name() {
        let executor = ToolExecutor::standard();
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("x.txt"), "hello").unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let call = ToolCall {
            id: "call_2".to_string(),
            name: "read_file".to_string(),
            input: serde_json::json!({"filename": "x.txt"}),
        };

        let result = executor.execute(&call, &ctx).await;
        assert!(!result.is_error);
        assert_eq!(result.json()["content"], "hello");
    }
}
