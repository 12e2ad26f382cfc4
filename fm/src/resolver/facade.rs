//! Resolver facade

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, info, warn};

use super::aggregator::{PermutationOutcome, PermutationRun, RunStatistics};
use super::{
    Argument, CancelFlag, PermutationSampler, Proposal, ResolutionReport, ResolveError, ResolverConfig, Roster, graph,
};
use crate::qbaf::{
    FixedPointEvaluator, GradientOracle, InfluenceOracle, Semantics, SemanticsError, SemanticsEvaluator, SettledFramework,
};

/// Outcome of one `resolve` call
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Winning action id, always one of the proposed actions
    pub winner: String,
    /// (proposer, mean influence) by descending absolute influence
    pub influence: Vec<(String, f64)>,
    pub report: ResolutionReport,
}

/// Turns conflicting proposals into one decision
///
/// Statistics are accumulated per call; the resolver only keeps a snapshot
/// of the last successful run for display, so concurrent calls on the same
/// instance do not share state.
pub struct Resolver {
    roster: Roster,
    semantics: Semantics,
    permutations: usize,
    seed: u64,
    parallelism: usize,
    evaluator: Arc<dyn SemanticsEvaluator<Argument>>,
    oracle: Arc<dyn InfluenceOracle<Argument>>,
    last_run: Mutex<Option<ResolutionReport>>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("roster", &self.roster)
            .field("semantics", &self.semantics)
            .field("permutations", &self.permutations)
            .field("seed", &self.seed)
            .field("parallelism", &self.parallelism)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Create a resolver with the built-in evaluator and gradient oracle
    pub fn new(roster: Roster, config: &ResolverConfig) -> Result<Self, ResolveError> {
        debug!(?config, proposers = roster.len(), "Resolver::new: called");
        let semantics: Semantics = config.semantics.parse()?;

        if config.permutations == 0 {
            return Err(ResolveError::Configuration(
                "permutation count must be at least 1".to_string(),
            ));
        }

        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        let available = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        let parallelism = match config.parallelism {
            0 => available,
            n => n.min(available),
        };

        info!(%semantics, permutations = config.permutations, seed, parallelism, "Resolver created");
        Ok(Self {
            roster,
            semantics,
            permutations: config.permutations,
            seed,
            parallelism,
            evaluator: Arc::new(FixedPointEvaluator::default()),
            oracle: Arc::new(GradientOracle::default()),
            last_run: Mutex::new(None),
        })
    }

    /// Replace the semantics evaluator
    pub fn with_evaluator(mut self, evaluator: Arc<dyn SemanticsEvaluator<Argument>>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Replace the influence oracle
    pub fn with_oracle(mut self, oracle: Arc<dyn InfluenceOracle<Argument>>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn semantics(&self) -> Semantics {
        self.semantics
    }

    pub fn permutations(&self) -> usize {
        self.permutations
    }

    /// Seed driving the permutation sampler, drawn at construction when not configured
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Statistics of the most recent successful resolution
    pub fn last_run(&self) -> Option<ResolutionReport> {
        match self.last_run.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Resolve proposals into a winning action and an influence ranking
    pub fn resolve(&self, proposals: &[Proposal]) -> Result<Resolution, ResolveError> {
        self.resolve_with_cancel(proposals, &CancelFlag::new())
    }

    /// Like `resolve`, checking `cancel` between permutations
    ///
    /// A cancelled resolution returns `Cancelled` and leaves the last-run
    /// snapshot untouched.
    pub fn resolve_with_cancel(&self, proposals: &[Proposal], cancel: &CancelFlag) -> Result<Resolution, ResolveError> {
        debug!(proposals = proposals.len(), "Resolver::resolve_with_cancel: called");
        self.roster.check(proposals)?;

        let run = PermutationRun::new(
            proposals,
            &self.roster,
            self.semantics,
            self.evaluator.as_ref(),
            self.oracle.as_ref(),
        );
        let orderings: Vec<Vec<usize>> = PermutationSampler::new(self.seed, proposals.len(), self.permutations).collect();

        let mut stats = RunStatistics::new(&run);
        for (permutation, result) in self.evaluate_all(&run, &orderings, cancel).into_iter().enumerate() {
            let outcome = result.map_err(|source| ResolveError::Evaluator { permutation, source })?;
            stats.absorb(&outcome);
        }

        if stats.permutations() < self.permutations {
            warn!(completed = stats.permutations(), "Resolution cancelled");
            return Err(ResolveError::Cancelled {
                completed: stats.permutations(),
            });
        }

        let report = stats.finish(self.seed, self.semantics);
        info!(winner = %report.winner, permutations = report.permutations, "Resolved proposals");

        match self.last_run.lock() {
            Ok(mut guard) => *guard = Some(report.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(report.clone()),
        }

        Ok(Resolution {
            winner: report.winner.clone(),
            influence: report.influence(),
            report,
        })
    }

    /// The settled framework of the natural (collection) ordering
    ///
    /// This is the graph of the first permutation of every resolution, so it
    /// can be rendered next to the decision.
    pub fn natural_framework(&self, proposals: &[Proposal]) -> Result<SettledFramework<Argument>, ResolveError> {
        debug!(proposals = proposals.len(), "Resolver::natural_framework: called");
        self.roster.check(proposals)?;
        let ordered: Vec<&Proposal> = proposals.iter().collect();
        graph::build(&ordered, &self.roster, self.semantics)
            .and_then(|framework| self.evaluator.evaluate(framework))
            .map_err(|source| ResolveError::Evaluator { permutation: 0, source })
    }

    /// Evaluate orderings, returning results in permutation order
    ///
    /// Stops at the first failure or when cancelled, so the result may be
    /// shorter than `orderings`.
    fn evaluate_all(
        &self,
        run: &PermutationRun<'_>,
        orderings: &[Vec<usize>],
        cancel: &CancelFlag,
    ) -> Vec<Result<PermutationOutcome, SemanticsError>> {
        let workers = self.parallelism.min(orderings.len()).max(1);
        if workers == 1 {
            return evaluate_chunk(run, orderings, cancel);
        }

        debug!(workers, "Resolver::evaluate_all: evaluating in parallel");
        let chunk_size = orderings.len().div_ceil(workers);
        let chunks: Vec<Vec<_>> = thread::scope(|scope| {
            let handles: Vec<_> = orderings
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move || evaluate_chunk(run, chunk, cancel)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|payload| std::panic::resume_unwind(payload)))
                .collect()
        });

        // keep a contiguous prefix so permutation indices stay aligned
        let mut merged = Vec::with_capacity(orderings.len());
        for (chunk, results) in orderings.chunks(chunk_size).zip(chunks) {
            let complete = results.len() == chunk.len() && results.iter().all(Result::is_ok);
            merged.extend(results);
            if !complete {
                break;
            }
        }
        merged
    }
}

fn evaluate_chunk(
    run: &PermutationRun<'_>,
    orderings: &[Vec<usize>],
    cancel: &CancelFlag,
) -> Vec<Result<PermutationOutcome, SemanticsError>> {
    let mut results = Vec::with_capacity(orderings.len());
    for ordering in orderings {
        if cancel.is_cancelled() {
            break;
        }
        let result = run.evaluate(ordering);
        let failed = result.is_err();
        results.push(result);
        if failed {
            break;
        }
    }
    results
}
