//! Argumentation-based proposal resolution
//!
//! Several proposers each nominate one action. The resolver turns every
//! sampled ordering of those nominations into a bipolar argumentation
//! framework, settles it, and aggregates the per-ordering winners and
//! influence gradients into one decision with per-proposer diagnostics.

mod aggregator;
mod cancel;
mod config;
mod error;
mod facade;
pub mod graph;
mod proposal;
mod sampler;
mod stats;

pub use aggregator::{PermutationOutcome, PermutationRun, RunStatistics};
pub use cancel::CancelFlag;
pub use config::ResolverConfig;
pub use error::{ErrorKind, ResolveError};
pub use facade::{Resolution, Resolver};
pub use proposal::{Argument, Proposal, Roster, RosterEntry};
pub use sampler::PermutationSampler;
pub use stats::{ActionStats, ProposerStats, ResolutionReport};
