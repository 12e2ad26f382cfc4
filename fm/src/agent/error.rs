//! Agent error types

use thiserror::Error;

use crate::llm::LlmError;

/// Errors raised while an agent talks to its model
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent {agent}: {source}")]
    Llm {
        agent: String,
        #[source]
        source: LlmError,
    },

    #[error("Agent {agent} returned a malformed nomination: {reason}")]
    MalformedNomination { agent: String, reason: String },

    #[error("Agent {agent} nominated unknown tool '{tool}'")]
    UnknownTool { agent: String, tool: String },

    #[error("Coordinator did not call the selected tool '{tool}'")]
    MissingToolCall { tool: String },
}

impl AgentError {
    /// Id of the agent that failed, if it was a worker or the coordinator
    pub fn agent(&self) -> &str {
        match self {
            AgentError::Llm { agent, .. }
            | AgentError::MalformedNomination { agent, .. }
            | AgentError::UnknownTool { agent, .. } => agent,
            AgentError::MissingToolCall { .. } => "coordinator",
        }
    }
}
