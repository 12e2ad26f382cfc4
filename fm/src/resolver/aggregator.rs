//! Per-permutation evaluation and stability statistics
//!
//! Each ordering is turned into a framework, settled, and reduced to a
//! `PermutationOutcome`. Outcomes are folded into `RunStatistics`, which
//! lives only for one resolution and is finally turned into a report.

use std::collections::HashMap;

use tracing::debug;

use super::{ActionStats, Argument, Proposal, ProposerStats, ResolutionReport, Roster, graph};
use crate::qbaf::{InfluenceOracle, Semantics, SemanticsError, SemanticsEvaluator};

/// What one ordering contributed
#[derive(Debug, Clone, PartialEq)]
pub struct PermutationOutcome {
    /// Final strength per action, in natural action order
    pub action_strengths: Vec<f64>,
    /// Index of the local winner in natural action order
    pub winner: usize,
    /// Winner strength minus runner-up strength
    pub margin: f64,
    /// Influence of each roster proposer on the local winner, in roster order
    pub influence: Vec<f64>,
}

/// Shared, read-only inputs for evaluating orderings of one proposal list
pub struct PermutationRun<'a> {
    pub proposals: &'a [Proposal],
    pub roster: &'a Roster,
    pub semantics: Semantics,
    pub evaluator: &'a dyn SemanticsEvaluator<Argument>,
    pub oracle: &'a dyn InfluenceOracle<Argument>,
    actions: Vec<String>,
}

impl<'a> PermutationRun<'a> {
    pub fn new(
        proposals: &'a [Proposal],
        roster: &'a Roster,
        semantics: Semantics,
        evaluator: &'a dyn SemanticsEvaluator<Argument>,
        oracle: &'a dyn InfluenceOracle<Argument>,
    ) -> Self {
        let mut actions: Vec<String> = Vec::new();
        for proposal in proposals {
            if !actions.contains(&proposal.action) {
                actions.push(proposal.action.clone());
            }
        }
        Self {
            proposals,
            roster,
            semantics,
            evaluator,
            oracle,
            actions,
        }
    }

    /// Distinct actions in order of first appearance in the natural ordering
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Build, settle and measure one ordering of the proposals
    pub fn evaluate(&self, ordering: &[usize]) -> Result<PermutationOutcome, SemanticsError> {
        debug!(?ordering, "PermutationRun::evaluate: called");
        let ordered: Vec<&Proposal> = ordering.iter().map(|&i| &self.proposals[i]).collect();
        let framework = graph::build(&ordered, self.roster, self.semantics)?;
        let settled = self.evaluator.evaluate(framework)?;

        let action_strengths = self
            .actions
            .iter()
            .map(|action| {
                let argument = Argument::Action(action.clone());
                settled
                    .strength(&argument)
                    .ok_or_else(|| SemanticsError::UnknownArgument(argument.to_string()))
            })
            .collect::<Result<Vec<f64>, _>>()?;

        let mut ranked: Vec<usize> = (0..action_strengths.len()).collect();
        ranked.sort_by(|&a, &b| action_strengths[b].total_cmp(&action_strengths[a]));
        let winner = ranked[0];
        let margin = ranked
            .get(1)
            .map_or(0.0, |&second| action_strengths[winner] - action_strengths[second]);

        let target = Argument::Action(self.actions[winner].clone());
        let influence = self
            .roster
            .ids()
            .map(|id| {
                let query = [Argument::Proposer(id.to_string())];
                let contributions = self.oracle.influence(self.evaluator, &settled, &target, &query)?;
                contributions
                    .first()
                    .map(|(_, value)| *value)
                    .ok_or_else(|| SemanticsError::UnknownArgument(query[0].to_string()))
            })
            .collect::<Result<Vec<f64>, _>>()?;

        Ok(PermutationOutcome {
            action_strengths,
            winner,
            margin,
            influence,
        })
    }
}

/// Call-scoped accumulators
#[derive(Debug, Clone)]
pub struct RunStatistics {
    actions: Vec<String>,
    proposers: Vec<String>,
    /// Natural action index nominated by each roster proposer, if any
    nominated: Vec<Option<usize>>,
    strength_sum: Vec<f64>,
    win_count: Vec<usize>,
    margin_sum: Vec<f64>,
    influence_sum: Vec<f64>,
    influence_square_sum: Vec<f64>,
    proposal_wins: Vec<usize>,
    permutations: usize,
}

impl RunStatistics {
    pub fn new(run: &PermutationRun<'_>) -> Self {
        let actions = run.actions().to_vec();
        let action_index: HashMap<&str, usize> = actions.iter().enumerate().map(|(i, a)| (a.as_str(), i)).collect();
        let proposers: Vec<String> = run.roster.ids().map(str::to_string).collect();
        let nominated = proposers
            .iter()
            .map(|id| {
                run.proposals
                    .iter()
                    .find(|p| &p.proposer == id)
                    .and_then(|p| action_index.get(p.action.as_str()).copied())
            })
            .collect();

        let (n_actions, n_proposers) = (actions.len(), proposers.len());
        Self {
            actions,
            proposers,
            nominated,
            strength_sum: vec![0.0; n_actions],
            win_count: vec![0; n_actions],
            margin_sum: vec![0.0; n_actions],
            influence_sum: vec![0.0; n_proposers],
            influence_square_sum: vec![0.0; n_proposers],
            proposal_wins: vec![0; n_proposers],
            permutations: 0,
        }
    }

    /// Number of outcomes absorbed so far
    pub fn permutations(&self) -> usize {
        self.permutations
    }

    pub fn absorb(&mut self, outcome: &PermutationOutcome) {
        for (sum, strength) in self.strength_sum.iter_mut().zip(&outcome.action_strengths) {
            *sum += strength;
        }
        self.win_count[outcome.winner] += 1;
        self.margin_sum[outcome.winner] += outcome.margin;

        for (i, influence) in outcome.influence.iter().enumerate() {
            self.influence_sum[i] += influence;
            self.influence_square_sum[i] += influence * influence;
            if self.nominated[i] == Some(outcome.winner) {
                self.proposal_wins[i] += 1;
            }
        }
        self.permutations += 1;
    }

    /// Turn the accumulators into a report and pick the global winner
    ///
    /// Must only be called after at least one outcome was absorbed.
    pub fn finish(self, seed: u64, semantics: Semantics) -> ResolutionReport {
        debug!(permutations = self.permutations, "RunStatistics::finish: called");
        let n = self.permutations as f64;

        let actions: Vec<ActionStats> = self
            .actions
            .iter()
            .enumerate()
            .map(|(i, action)| ActionStats {
                action: action.clone(),
                mean_strength: self.strength_sum[i] / n,
                win_rate: self.win_count[i] as f64 / n,
                mean_margin: if self.win_count[i] > 0 {
                    self.margin_sum[i] / self.win_count[i] as f64
                } else {
                    0.0
                },
            })
            .collect();

        let mut best = 0;
        for (i, stats) in actions.iter().enumerate().skip(1) {
            let current = &actions[best];
            let ordering = stats
                .mean_strength
                .total_cmp(&current.mean_strength)
                .then(stats.win_rate.total_cmp(&current.win_rate));
            if ordering.is_gt() {
                best = i;
            }
        }
        let winner = actions.get(best).map(|s| s.action.clone()).unwrap_or_default();

        let mut proposers: Vec<ProposerStats> = self
            .proposers
            .iter()
            .enumerate()
            .map(|(i, proposer)| {
                let mean = self.influence_sum[i] / n;
                let mean_square = self.influence_square_sum[i] / n;
                ProposerStats {
                    proposer: proposer.clone(),
                    mean_influence: mean,
                    influence_std: (mean_square - mean * mean).max(0.0).sqrt(),
                    proposal_win_rate: self.proposal_wins[i] as f64 / n,
                }
            })
            .collect();
        proposers.sort_by(|a, b| b.mean_influence.abs().total_cmp(&a.mean_influence.abs()));

        ResolutionReport {
            seed,
            permutations: self.permutations,
            semantics,
            winner,
            actions,
            proposers,
        }
    }
}
