//! Proposals, proposer rosters and argument labels

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ResolveError;

/// Label of a node in a proposal graph
///
/// Proposer ids and action ids live in separate namespaces, so a worker
/// called `read_file` never collides with the `read_file` action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Argument {
    Proposer(String),
    Action(String),
}

impl Argument {
    pub fn id(&self) -> &str {
        match self {
            Argument::Proposer(id) | Argument::Action(id) => id,
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(self, Argument::Action(_))
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Proposer(id) => write!(f, "proposer:{}", id),
            Argument::Action(id) => write!(f, "action:{}", id),
        }
    }
}

/// One proposer's nomination of an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub proposer: String,
    pub action: String,
    /// Free-text justification, carried for display only
    #[serde(default)]
    pub motivation: String,
}

impl Proposal {
    pub fn new(proposer: impl Into<String>, action: impl Into<String>, motivation: impl Into<String>) -> Self {
        Self {
            proposer: proposer.into(),
            action: action.into(),
            motivation: motivation.into(),
        }
    }
}

/// A proposer identity with its fixed credibility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: String,
    pub strength: f64,
}

impl RosterEntry {
    pub fn new(id: impl Into<String>, strength: f64) -> Self {
        Self {
            id: id.into(),
            strength,
        }
    }
}

/// The fixed set of proposers a resolver knows about
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Validate a roster: unique ids, strengths in [0, 1]
    pub fn new(entries: Vec<RosterEntry>) -> Result<Self, ResolveError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.id.is_empty() {
                return Err(ResolveError::Configuration("roster entry with empty id".to_string()));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(ResolveError::Configuration(format!(
                    "proposer {} appears twice in the roster",
                    entry.id
                )));
            }
            if !entry.strength.is_finite() || !(0.0..=1.0).contains(&entry.strength) {
                return Err(ResolveError::Configuration(format!(
                    "proposer {} has strength {} outside [0, 1]",
                    entry.id, entry.strength
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn strength(&self, id: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.strength)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reject proposal lists the resolver cannot work with
    pub fn check(&self, proposals: &[Proposal]) -> Result<(), ResolveError> {
        if proposals.is_empty() {
            return Err(ResolveError::EmptyProposals);
        }

        let mut seen = HashSet::new();
        for proposal in proposals {
            if !self.contains(&proposal.proposer) {
                return Err(ResolveError::UnknownProposer {
                    proposer: proposal.proposer.clone(),
                });
            }
            if proposal.action.trim().is_empty() {
                return Err(ResolveError::EmptyAction {
                    proposer: proposal.proposer.clone(),
                });
            }
            if !seen.insert(proposal.proposer.as_str()) {
                return Err(ResolveError::DuplicateProposer {
                    proposer: proposal.proposer.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ErrorKind;

    fn roster() -> Roster {
        Roster::new(vec![RosterEntry::new("A1", 0.1), RosterEntry::new("A2", 0.9)]).unwrap()
    }

    #[test]
    fn test_argument_namespaces_are_disjoint() {
        let proposer = Argument::Proposer("read_file".to_string());
        let action = Argument::Action("read_file".to_string());
        assert_ne!(proposer, action);
        assert_eq!(proposer.id(), action.id());
        assert!(action.is_action());
        assert_eq!(action.to_string(), "action:read_file");
    }

    #[test]
    fn test_roster_rejects_duplicates() {
        let err = Roster::new(vec![RosterEntry::new("A1", 0.1), RosterEntry::new("A1", 0.2)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_roster_rejects_out_of_range_strength() {
        let err = Roster::new(vec![RosterEntry::new("A1", 1.5)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(Roster::new(vec![RosterEntry::new("A1", f64::NAN)]).is_err());
    }

    #[test]
    fn test_roster_lookup() {
        let roster = roster();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.strength("A2"), Some(0.9));
        assert_eq!(roster.strength("A3"), None);
        assert_eq!(roster.ids().collect::<Vec<_>>(), vec!["A1", "A2"]);
    }

    #[test]
    fn test_check_rejects_bad_proposals() {
        let roster = roster();
        assert!(matches!(roster.check(&[]), Err(ResolveError::EmptyProposals)));
        assert!(matches!(
            roster.check(&[Proposal::new("A9", "read_file", "")]),
            Err(ResolveError::UnknownProposer { .. })
        ));
        assert!(matches!(
            roster.check(&[Proposal::new("A1", "  ", "")]),
            Err(ResolveError::EmptyAction { .. })
        ));
        assert!(matches!(
            roster.check(&[Proposal::new("A1", "read_file", ""), Proposal::new("A1", "edit_file", "")]),
            Err(ResolveError::DuplicateProposer { .. })
        ));
        assert!(roster.check(&[Proposal::new("A1", "read_file", "")]).is_ok());
    }
}
