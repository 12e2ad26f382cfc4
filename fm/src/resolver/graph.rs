//! Argument graph construction for one ordering of proposals

use std::collections::HashSet;

use tracing::debug;

use super::{Argument, Proposal, Roster};
use crate::qbaf::{Framework, Semantics, SemanticsError};

/// Initial strength of every action argument
pub const ACTION_STRENGTH: f64 = 0.5;

/// Attack and support relations of one ordering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relations {
    pub attacks: Vec<(Argument, Argument)>,
    pub supports: Vec<(Argument, Argument)>,
}

/// Derive relations from proposals in the given order
///
/// The first proposer to name an action supports it. Every later proposer
/// looks back over the ones before it, most recent first: it supports the
/// nearest peer that named the same action and attacks the nearest backer of
/// each competing action.
pub fn relations(ordering: &[&Proposal]) -> Relations {
    let mut relations = Relations::default();
    let mut claimed: HashSet<&str> = HashSet::new();

    for (i, proposal) in ordering.iter().enumerate() {
        let proposer = Argument::Proposer(proposal.proposer.clone());

        if claimed.insert(proposal.action.as_str()) {
            relations
                .supports
                .push((proposer.clone(), Argument::Action(proposal.action.clone())));
        }

        let mut supported = false;
        let mut attacked: HashSet<&str> = HashSet::new();
        for prior in ordering[..i].iter().rev() {
            if prior.action == proposal.action {
                if !supported {
                    relations
                        .supports
                        .push((proposer.clone(), Argument::Proposer(prior.proposer.clone())));
                    supported = true;
                }
            } else if attacked.insert(prior.action.as_str()) {
                relations
                    .attacks
                    .push((proposer.clone(), Argument::Proposer(prior.proposer.clone())));
            }
        }
    }

    relations
}

/// Build the framework for one ordering
///
/// Arguments are the roster proposers in roster order followed by the
/// actions in order of first appearance in `ordering`.
pub fn build(ordering: &[&Proposal], roster: &Roster, semantics: Semantics) -> Result<Framework<Argument>, SemanticsError> {
    debug!(proposals = ordering.len(), "graph::build: called");

    let mut arguments = Vec::with_capacity(roster.len() + ordering.len());
    let mut strengths = Vec::with_capacity(roster.len() + ordering.len());
    for entry in roster.entries() {
        arguments.push(Argument::Proposer(entry.id.clone()));
        strengths.push(entry.strength);
    }

    let mut seen = HashSet::new();
    for proposal in ordering {
        if seen.insert(proposal.action.as_str()) {
            arguments.push(Argument::Action(proposal.action.clone()));
            strengths.push(ACTION_STRENGTH);
        }
    }

    let Relations { attacks, supports } = relations(ordering);
    Framework::new(arguments, strengths, attacks, supports, semantics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::RosterEntry;

    fn p(id: &str) -> Argument {
        Argument::Proposer(id.to_string())
    }

    fn a(id: &str) -> Argument {
        Argument::Action(id.to_string())
    }

    fn proposals(pairs: &[(&str, &str)]) -> Vec<Proposal> {
        pairs.iter().map(|(who, what)| Proposal::new(*who, *what, "")).collect()
    }

    #[test]
    fn test_single_proposal_supports_its_action() {
        let props = proposals(&[("A1", "read_file")]);
        let ordering: Vec<&Proposal> = props.iter().collect();
        let rel = relations(&ordering);
        assert_eq!(rel.supports, vec![(p("A1"), a("read_file"))]);
        assert!(rel.attacks.is_empty());
    }

    #[test]
    fn test_only_first_claim_supports_action() {
        let props = proposals(&[("A1", "read_file"), ("A2", "read_file"), ("A3", "read_file")]);
        let ordering: Vec<&Proposal> = props.iter().collect();
        let rel = relations(&ordering);
        // A2 -> A1, A3 -> A2 (nearest peer only)
        assert_eq!(
            rel.supports,
            vec![(p("A1"), a("read_file")), (p("A2"), p("A1")), (p("A3"), p("A2"))]
        );
        assert!(rel.attacks.is_empty());
    }

    #[test]
    fn test_one_attack_per_competing_action() {
        let props = proposals(&[
            ("A1", "read_file"),
            ("A2", "edit_file"),
            ("A3", "edit_file"),
            ("A4", "list_files"),
        ]);
        let ordering: Vec<&Proposal> = props.iter().collect();
        let rel = relations(&ordering);
        assert_eq!(
            rel.attacks,
            vec![
                (p("A2"), p("A1")),
                (p("A3"), p("A1")),
                // A4 attacks the nearest edit_file backer and the read_file backer
                (p("A4"), p("A3")),
                (p("A4"), p("A1")),
            ]
        );
        assert!(rel.supports.contains(&(p("A3"), p("A2"))));
        assert!(!rel.attacks.contains(&(p("A4"), p("A2"))));
    }

    #[test]
    fn test_edges_point_backwards() {
        let props = proposals(&[("A1", "read_file"), ("A2", "edit_file"), ("A3", "read_file")]);
        let ordering: Vec<&Proposal> = props.iter().collect();
        let rel = relations(&ordering);
        let position = |arg: &Argument| ordering.iter().position(|q| Argument::Proposer(q.proposer.clone()) == *arg);
        for (source, target) in rel.attacks.iter().chain(rel.supports.iter()) {
            if let (Some(s), Some(t)) = (position(source), position(target)) {
                assert!(s > t);
            }
        }
    }

    #[test]
    fn test_build_orders_roster_then_actions() {
        let roster = Roster::new(vec![
            RosterEntry::new("A1", 0.1),
            RosterEntry::new("A2", 0.9),
            RosterEntry::new("A3", 0.2),
        ])
        .unwrap();
        let props = proposals(&[("A2", "edit_file"), ("A1", "read_file")]);
        let ordering: Vec<&Proposal> = props.iter().collect();
        let fw = build(&ordering, &roster, Semantics::QuadraticEnergy).unwrap();

        assert_eq!(fw.arguments(), &[p("A1"), p("A2"), p("A3"), a("edit_file"), a("read_file")]);
        assert_eq!(fw.initial_strengths(), &[0.1, 0.9, 0.2, 0.5, 0.5]);
        assert_eq!(fw.attacks().count(), 1);
        assert_eq!(fw.supports().count(), 2);
    }

    #[test]
    fn test_proposer_named_like_action_does_not_collide() {
        let roster = Roster::new(vec![RosterEntry::new("read_file", 0.4)]).unwrap();
        let props = proposals(&[("read_file", "read_file")]);
        let ordering: Vec<&Proposal> = props.iter().collect();
        let fw = build(&ordering, &roster, Semantics::QuadraticEnergy).unwrap();
        assert_eq!(fw.len(), 2);
    }
}
