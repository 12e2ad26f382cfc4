//! Debate error types

use thiserror::Error;

use crate::agent::AgentError;
use crate::resolver::ResolveError;

/// Why a user turn ended without an answer
#[derive(Debug, Error)]
pub enum DebateError {
    #[error("Agent failure: {0}")]
    Agent(#[from] AgentError),

    #[error("No decision this round: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Workers selected '{action}', which is not a registered tool")]
    UnregisteredAction { action: String },
}
