//! CoordinatorAgent - executes the tool the workers agreed on

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::AgentError;
use crate::llm::{
    CompletionRequest, CompletionResponse, ContentBlock, LlmClient, Message, ToolCall, ToolChoice, ToolDefinition,
};
use crate::tools::ToolResult;

/// The only agent that calls tools
///
/// Workers decide *which* tool runs; the coordinator decides the arguments
/// and writes the final answer once no further tool is wanted.
pub struct CoordinatorAgent {
    system_prompt: String,
    history: Vec<Message>,
    pending_input: Option<String>,
    llm: Arc<dyn LlmClient>,
    max_tokens: u32,
}

impl CoordinatorAgent {
    pub fn new(system_prompt: String, llm: Arc<dyn LlmClient>, max_tokens: u32) -> Self {
        debug!("CoordinatorAgent::new: called");
        Self {
            system_prompt,
            history: Vec::new(),
            pending_input: None,
            llm,
            max_tokens,
        }
    }

    /// Start a user turn; the input is sent with the next instruction
    pub fn begin_turn(&mut self, input: &str) {
        debug!(input_len = input.len(), "CoordinatorAgent::begin_turn: called");
        self.pending_input = Some(input.to_string());
    }

    /// Conversation so far
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    fn instruction(&mut self, information: &str) -> String {
        match self.pending_input.take() {
            Some(input) => format!(
                "[START USER INPUT]\n{}\n[END USER INPUT]\n[START INFORMATION]\n{}\n[END INFORMATION]",
                input, information
            ),
            None => format!("[START INFORMATION]\n{}\n[END INFORMATION]", information),
        }
    }

    async fn complete(&self, tools: Vec<ToolDefinition>, tool_choice: ToolChoice) -> Result<CompletionResponse, AgentError> {
        let request = CompletionRequest {
            system_prompt: self.system_prompt.clone(),
            messages: self.history.clone(),
            tools,
            tool_choice,
            max_tokens: self.max_tokens,
        };
        self.llm.complete(request).await.map_err(|source| AgentError::Llm {
            agent: "coordinator".to_string(),
            source,
        })
    }

    /// Ask the model to call `tool` with arguments of its choosing
    ///
    /// Only the selected tool is offered and a call is required. Extra calls
    /// the model makes are dropped so every recorded call gets a result.
    pub async fn call_tool(&mut self, tool: &ToolDefinition) -> Result<ToolCall, AgentError> {
        debug!(tool = %tool.name, "CoordinatorAgent::call_tool: called");
        let text = self.instruction(&format!(
            "The worker agents have chosen tool: {} . Call tool {} with parameters of your choice.",
            tool.name, tool.name
        ));
        self.history.push(Message::user(text));

        let response = self.complete(vec![tool.clone()], ToolChoice::Required).await?;
        if response.tool_calls.len() > 1 {
            warn!(count = response.tool_calls.len(), "Coordinator made several tool calls, keeping the first");
        }
        let call = response
            .tool_calls
            .into_iter()
            .find(|c| c.name == tool.name)
            .ok_or_else(|| AgentError::MissingToolCall {
                tool: tool.name.clone(),
            })?;

        let mut blocks = Vec::new();
        if let Some(text) = response.content.filter(|t| !t.is_empty()) {
            blocks.push(ContentBlock::text(text));
        }
        blocks.push(ContentBlock::tool_use(&call));
        self.history.push(Message::assistant_blocks(blocks));

        info!(tool = %call.name, input = %call.input, "Coordinator called tool");
        Ok(call)
    }

    /// Record the outcome of the call made by `call_tool`
    pub fn record_result(&mut self, call: &ToolCall, result: &ToolResult) {
        debug!(tool = %call.name, is_error = result.is_error, "CoordinatorAgent::record_result: called");
        self.history.push(Message::user_blocks(vec![ContentBlock::tool_result(
            &call.id,
            &result.content,
            result.is_error,
        )]));
    }

    /// Answer the user without calling a tool
    ///
    /// `information` tells the model why no tool is called.
    pub async fn answer(&mut self, information: &str) -> Result<String, AgentError> {
        debug!("CoordinatorAgent::answer: called");
        let text = self.instruction(information);
        self.history.push(Message::user(text));

        let response = self.complete(vec![], ToolChoice::None).await?;
        let answer = response.content.unwrap_or_default();
        self.history.push(Message::assistant(answer.clone()));
        Ok(answer)
    }
}
