//! Resolution statistics

use serde::Serialize;

use crate::qbaf::Semantics;

/// Per-action results over all permutations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionStats {
    pub action: String,
    /// Final strength averaged over permutations
    pub mean_strength: f64,
    /// Share of permutations in which the action ranked first
    pub win_rate: f64,
    /// Average lead over the runner-up when it won, 0 if it never won
    pub mean_margin: f64,
}

/// Per-proposer results over all permutations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposerStats {
    pub proposer: String,
    pub mean_influence: f64,
    pub influence_std: f64,
    /// Share of permutations whose local winner was this proposer's action
    pub proposal_win_rate: f64,
}

/// Everything one resolution computed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionReport {
    pub seed: u64,
    pub permutations: usize,
    pub semantics: Semantics,
    pub winner: String,
    /// Actions in order of first appearance in the proposals
    pub actions: Vec<ActionStats>,
    /// Roster proposers by descending absolute mean influence
    pub proposers: Vec<ProposerStats>,
}

impl ResolutionReport {
    pub fn action(&self, name: &str) -> Option<&ActionStats> {
        self.actions.iter().find(|s| s.action == name)
    }

    pub fn proposer(&self, id: &str) -> Option<&ProposerStats> {
        self.proposers.iter().find(|s| s.proposer == id)
    }

    /// Ranked (proposer, mean influence) pairs
    pub fn influence(&self) -> Vec<(String, f64)> {
        self.proposers
            .iter()
            .map(|s| (s.proposer.clone(), s.mean_influence))
            .collect()
    }
}
