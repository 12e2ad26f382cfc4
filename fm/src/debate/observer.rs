//! Debate observer hooks

use crate::llm::ToolCall;
use crate::resolver::{Proposal, Resolution};
use crate::tools::ToolResult;

/// Receives the intermediate steps of a turn, for rendering
///
/// Every method defaults to doing nothing.
pub trait DebateObserver {
    /// Proposals collected for `round`, in natural order
    fn on_proposals(&mut self, _round: u32, _proposals: &[Proposal]) {}

    /// Outcome of resolving the round's proposals
    fn on_resolution(&mut self, _round: u32, _resolution: &Resolution) {}

    /// A tool the coordinator executed
    fn on_tool_result(&mut self, _call: &ToolCall, _result: &ToolResult) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl DebateObserver for SilentObserver {}
