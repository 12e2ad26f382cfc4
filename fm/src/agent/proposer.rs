//! Proposer trait and nomination parsing

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::AgentError;

/// An action nominated by one proposer for the current round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nomination {
    pub action: String,
    pub motivation: String,
}

impl Nomination {
    pub fn new(action: impl Into<String>, motivation: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            motivation: motivation.into(),
        }
    }
}

/// Something that nominates one action per round
///
/// Proposers keep their own view of the conversation. The debate loop feeds
/// them the user input and every executed tool result through `observe`.
#[async_trait]
pub trait Proposer: Send {
    /// Roster identity
    fn id(&self) -> &str;

    /// Credibility in [0, 1] used as the proposer's initial strength
    fn strength(&self) -> f64;

    /// Append a message to the proposer's conversation
    fn observe(&mut self, message: &str);

    /// Nominate an action for the current state of the conversation
    async fn propose(&mut self) -> Result<Nomination, AgentError>;
}

#[derive(Debug, Deserialize)]
struct RawNomination {
    tool_name: String,
    #[serde(default)]
    motivation: String,
}

/// Parse a `{"tool_name", "motivation"}` reply
///
/// Tolerates a surrounding code fence or prose around the JSON object.
/// `allowed` lists the action names the proposer may nominate.
pub fn parse_nomination(agent: &str, reply: &str, allowed: &[String]) -> Result<Nomination, AgentError> {
    debug!(%agent, reply_len = reply.len(), "parse_nomination: called");
    let malformed = |reason: String| AgentError::MalformedNomination {
        agent: agent.to_string(),
        reason,
    };

    let start = reply.find('{').ok_or_else(|| malformed("no JSON object in reply".to_string()))?;
    let end = reply.rfind('}').ok_or_else(|| malformed("unterminated JSON object".to_string()))?;
    if end < start {
        return Err(malformed("unterminated JSON object".to_string()));
    }

    let raw: RawNomination = serde_json::from_str(&reply[start..=end]).map_err(|e| malformed(e.to_string()))?;
    let tool = raw.tool_name.trim();
    if tool.is_empty() {
        return Err(malformed("empty tool_name".to_string()));
    }
    if !allowed.iter().any(|a| a == tool) {
        debug!(%agent, %tool, "parse_nomination: tool not in catalogue");
        return Err(AgentError::UnknownTool {
            agent: agent.to_string(),
            tool: tool.to_string(),
        });
    }

    Ok(Nomination::new(tool, raw.motivation.trim()))
}
