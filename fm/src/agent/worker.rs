//! WorkerAgent - an LLM-backed proposer

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::proposer::parse_nomination;
use super::{AgentError, Nomination, Proposer};
use crate::llm::{CompletionRequest, LlmClient, Message, ToolChoice};

/// A worker that nominates tools by asking its model for a JSON verdict
///
/// The worker never calls tools itself; the request it sends offers none.
pub struct WorkerAgent {
    id: String,
    strength: f64,
    system_prompt: String,
    allowed: Vec<String>,
    history: Vec<Message>,
    llm: Arc<dyn LlmClient>,
    max_tokens: u32,
}

impl WorkerAgent {
    /// Create a worker
    ///
    /// `allowed` is the tool catalogue plus the skip action.
    pub fn new(
        id: impl Into<String>,
        strength: f64,
        system_prompt: String,
        allowed: Vec<String>,
        llm: Arc<dyn LlmClient>,
        max_tokens: u32,
    ) -> Self {
        let id = id.into();
        debug!(%id, %strength, allowed = allowed.len(), "WorkerAgent::new: called");
        Self {
            id,
            strength,
            system_prompt,
            allowed,
            history: Vec::new(),
            llm,
            max_tokens,
        }
    }

    /// Conversation so far
    pub fn history(&self) -> &[Message] {
        &self.history
    }
}

#[async_trait]
impl Proposer for WorkerAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn strength(&self) -> f64 {
        self.strength
    }

    fn observe(&mut self, message: &str) {
        debug!(id = %self.id, message_len = message.len(), "WorkerAgent::observe: called");
        self.history.push(Message::user(message));
    }

    async fn propose(&mut self) -> Result<Nomination, AgentError> {
        debug!(id = %self.id, history = self.history.len(), "WorkerAgent::propose: called");
        let request = CompletionRequest {
            system_prompt: self.system_prompt.clone(),
            messages: self.history.clone(),
            tools: vec![],
            tool_choice: ToolChoice::None,
            max_tokens: self.max_tokens,
        };

        let response = self.llm.complete(request).await.map_err(|source| AgentError::Llm {
            agent: self.id.clone(),
            source,
        })?;
        let reply = response.content.unwrap_or_default();
        let nomination = parse_nomination(&self.id, &reply, &self.allowed)?;
        self.history.push(Message::assistant(reply));

        info!(id = %self.id, action = %nomination.action, "Worker nominated action");
        Ok(nomination)
    }
}
