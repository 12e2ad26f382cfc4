//! Session counters shown by `/stats`

use std::collections::BTreeMap;

/// Counters accumulated over a chat session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebateStats {
    /// User turns that produced an answer
    pub turns: u32,
    /// User turns that ended in an error
    pub failed_turns: u32,
    /// Proposal rounds across all turns
    pub rounds: u32,
    /// Tools executed
    pub tool_calls: u32,
    /// Tool executions that reported an error
    pub tool_errors: u32,
    /// Rounds won, by action
    pub wins: BTreeMap<String, u32>,
}

impl DebateStats {
    pub(crate) fn record_win(&mut self, action: &str) {
        *self.wins.entry(action.to_string()).or_default() += 1;
    }
}
