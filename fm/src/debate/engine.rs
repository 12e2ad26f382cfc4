//! Debate - the propose, resolve, execute loop for one user turn

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use eyre::{Context, Result};
use tracing::{debug, info, warn};

use super::{DebateError, DebateObserver, DebateStats};
use crate::agent::{CoordinatorAgent, Proposer, WorkerAgent, collect_proposals};
use crate::config::Config;
use crate::llm::LlmClient;
use crate::prompts::{CoordinatorPromptContext, PromptLoader, WorkerPromptContext};
use crate::resolver::{CancelFlag, Proposal, Resolution, ResolveError, Resolver, ResolverConfig, Roster, RosterEntry};
use crate::tools::{SKIP_ACTION, ToolContext, ToolExecutor};

const DEFAULT_MAX_ROUNDS: u32 = 8;
const SKIP_INFORMATION: &str = "The worker agents recommend to not call a tool.";

/// How a user turn ended
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The coordinator's answer
    pub answer: String,
    /// Proposal rounds used
    pub rounds: u32,
    /// Tools executed, in order
    pub tools: Vec<String>,
    /// Whether the round limit forced the answer
    pub exhausted: bool,
}

/// Workers, coordinator, resolver and tools wired together
pub struct Debate {
    workers: Vec<Box<dyn Proposer>>,
    coordinator: CoordinatorAgent,
    resolver: Arc<Resolver>,
    executor: ToolExecutor,
    ctx: ToolContext,
    max_rounds: u32,
    proposal_concurrency: usize,
    graph_file: Option<PathBuf>,
    cancel: CancelFlag,
    stats: DebateStats,
}

impl Debate {
    /// Create a debate; the resolver roster is taken from the workers
    pub fn new(
        workers: Vec<Box<dyn Proposer>>,
        coordinator: CoordinatorAgent,
        executor: ToolExecutor,
        ctx: ToolContext,
        resolver_config: &ResolverConfig,
    ) -> Result<Self, ResolveError> {
        debug!(workers = workers.len(), "Debate::new: called");
        let roster = Roster::new(workers.iter().map(|w| RosterEntry::new(w.id(), w.strength())).collect())?;
        let resolver = Resolver::new(roster, resolver_config)?;
        info!(
            seed = resolver.seed(),
            permutations = resolver.permutations(),
            semantics = %resolver.semantics(),
            "Debate resolver ready"
        );

        Ok(Self {
            workers,
            coordinator,
            resolver: Arc::new(resolver),
            executor,
            ctx,
            max_rounds: DEFAULT_MAX_ROUNDS,
            proposal_concurrency: 0,
            graph_file: None,
            cancel: CancelFlag::new(),
            stats: DebateStats::default(),
        })
    }

    /// Build the full debate from configuration
    pub fn from_config(config: &Config, llm: Arc<dyn LlmClient>, root: PathBuf) -> Result<Self> {
        debug!(?root, workers = config.workers.len(), "Debate::from_config: called");
        let loader = PromptLoader::new(&root);
        let executor = ToolExecutor::standard();
        let definitions = executor.definitions();
        let mut allowed = executor.tool_names();
        allowed.push(SKIP_ACTION.to_string());

        let mut workers: Vec<Box<dyn Proposer>> = Vec::with_capacity(config.workers.len());
        for worker in &config.workers {
            let context = WorkerPromptContext::new(&definitions, SKIP_ACTION, worker.extra_prompt.clone());
            let prompt = loader.worker_prompt(&context)?;
            workers.push(Box::new(WorkerAgent::new(
                worker.id.clone(),
                worker.strength,
                prompt,
                allowed.clone(),
                llm.clone(),
                config.llm.max_tokens,
            )));
        }

        let coordinator_prompt = loader.coordinator_prompt(&CoordinatorPromptContext {
            root: root.display().to_string(),
        })?;
        let coordinator = CoordinatorAgent::new(coordinator_prompt, llm, config.llm.max_tokens);

        let ctx = if config.debate.sandbox {
            ToolContext::new(root)
        } else {
            ToolContext::new_unsandboxed(root)
        };

        let debate = Self::new(workers, coordinator, executor, ctx, &config.resolver)
            .context("Failed to build proposal resolver")?
            .with_max_rounds(config.debate.max_rounds)
            .with_proposal_concurrency(config.debate.proposal_concurrency)
            .with_graph_file(config.debate.graph_file.clone());
        Ok(debate)
    }

    /// Limit proposal rounds per user turn
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Bound concurrent worker calls (0 = one slot per worker)
    pub fn with_proposal_concurrency(mut self, concurrency: usize) -> Self {
        self.proposal_concurrency = concurrency;
        self
    }

    /// Rewrite this DOT file with every round's natural-order argument graph
    pub fn with_graph_file(mut self, path: Option<PathBuf>) -> Self {
        self.graph_file = path;
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn stats(&self) -> &DebateStats {
        &self.stats
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Ids of the workers, in roster order
    pub fn worker_ids(&self) -> Vec<&str> {
        self.workers.iter().map(|w| w.id()).collect()
    }

    /// Handle that interrupts the resolution in progress
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Run one user turn to completion
    ///
    /// Rounds repeat until the workers pick the skip action or the round
    /// limit is reached; then the coordinator answers. Any agent or resolver
    /// error ends the turn without an answer.
    pub async fn run_turn(&mut self, input: &str, observer: &mut dyn DebateObserver) -> Result<TurnOutcome, DebateError> {
        debug!(input_len = input.len(), "Debate::run_turn: called");
        self.cancel.clear();
        for worker in self.workers.iter_mut() {
            worker.observe(input);
        }
        self.coordinator.begin_turn(input);

        let outcome = self.rounds(observer).await;
        match &outcome {
            Ok(outcome) => {
                self.stats.turns += 1;
                info!(rounds = outcome.rounds, tools = outcome.tools.len(), "Turn complete");
            }
            Err(e) => {
                self.stats.failed_turns += 1;
                match e {
                    DebateError::Agent(err) => warn!(agent = err.agent(), error = %e, "Turn failed"),
                    DebateError::Resolve(err) => warn!(kind = ?err.kind(), error = %e, "Turn failed"),
                    DebateError::UnregisteredAction { .. } => warn!(error = %e, "Turn failed"),
                }
            }
        }
        outcome
    }

    fn write_graph(&self, path: &Path, proposals: &[Proposal]) -> Result<()> {
        let settled = self.resolver.natural_framework(proposals)?;
        fs::write(path, settled.to_dot()).context(format!("Failed to write {}", path.display()))?;
        debug!(?path, "Debate::write_graph: written");
        Ok(())
    }

    /// Resolve one round's proposals on the blocking pool
    async fn resolve(&self, proposals: Vec<Proposal>) -> Result<Resolution, ResolveError> {
        let resolver = Arc::clone(&self.resolver);
        let cancel = self.cancel.clone();
        match tokio::task::spawn_blocking(move || resolver.resolve_with_cancel(&proposals, &cancel)).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                warn!(error = %e, "Debate::resolve: resolution task aborted");
                Err(ResolveError::Cancelled { completed: 0 })
            }
        }
    }

    async fn rounds(&mut self, observer: &mut dyn DebateObserver) -> Result<TurnOutcome, DebateError> {
        let mut tools = Vec::new();

        for round in 1..=self.max_rounds {
            debug!(%round, "Debate::rounds: round start");
            self.stats.rounds += 1;

            let proposals = collect_proposals(&mut self.workers, self.proposal_concurrency).await?;
            observer.on_proposals(round, &proposals);

            if let Some(path) = &self.graph_file
                && let Err(e) = self.write_graph(path, &proposals)
            {
                warn!(error = %e, "Failed to write argument graph");
            }

            let resolution = self.resolve(proposals).await?;
            observer.on_resolution(round, &resolution);
            self.stats.record_win(&resolution.winner);
            info!(%round, winner = %resolution.winner, "Round resolved");

            if resolution.winner == SKIP_ACTION {
                let answer = self.coordinator.answer(SKIP_INFORMATION).await?;
                return Ok(TurnOutcome {
                    answer,
                    rounds: round,
                    tools,
                    exhausted: false,
                });
            }

            let definition = self
                .executor
                .definitions_for(&[resolution.winner.as_str()])
                .into_iter()
                .next()
                .ok_or_else(|| DebateError::UnregisteredAction {
                    action: resolution.winner.clone(),
                })?;
            let call = self.coordinator.call_tool(&definition).await?;
            let result = self.executor.execute(&call, &self.ctx).await;

            self.stats.tool_calls += 1;
            if result.is_error {
                self.stats.tool_errors += 1;
            }
            observer.on_tool_result(&call, &result);
            self.coordinator.record_result(&call, &result);

            let broadcast = format!(
                "[START TOOL RESULT]\ntool={}\nargs={}\nresult={}\n[END TOOL RESULT]",
                call.name, call.input, result.content
            );
            for worker in self.workers.iter_mut() {
                worker.observe(&broadcast);
            }
            tools.push(call.name);
        }

        warn!(max_rounds = self.max_rounds, "Round limit reached, asking coordinator to answer");
        let information = format!(
            "The limit of {} tool rounds for this request is reached. Do not call a tool; answer with the information gathered so far.",
            self.max_rounds
        );
        let answer = self.coordinator.answer(&information).await?;
        Ok(TurnOutcome {
            answer,
            rounds: self.max_rounds,
            tools,
            exhausted: true,
        })
    }
}
