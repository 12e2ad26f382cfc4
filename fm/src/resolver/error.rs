//! Resolver error types

use thiserror::Error;

use crate::qbaf::SemanticsError;

/// Broad classes of resolver failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The proposals handed to `resolve` were unusable
    InvalidInput,
    /// The semantics engine or influence oracle failed on a permutation
    EvaluatorFailure,
    /// The resolver was built with unusable settings
    Configuration,
    /// The caller cancelled the resolution
    Cancelled,
}

/// Errors that can occur while resolving proposals
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Proposal list must not be empty")]
    EmptyProposals,

    #[error("Proposal from {proposer} names no action")]
    EmptyAction { proposer: String },

    #[error("Proposer {proposer} is not in the roster")]
    UnknownProposer { proposer: String },

    #[error("Proposer {proposer} submitted more than one proposal")]
    DuplicateProposer { proposer: String },

    #[error("Invalid resolver configuration: {0}")]
    Configuration(String),

    #[error("Evaluation failed on permutation {permutation}: {source}")]
    Evaluator {
        permutation: usize,
        #[source]
        source: SemanticsError,
    },

    #[error("Resolution cancelled after {completed} permutations")]
    Cancelled { completed: usize },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::EmptyProposals
            | ResolveError::EmptyAction { .. }
            | ResolveError::UnknownProposer { .. }
            | ResolveError::DuplicateProposer { .. } => ErrorKind::InvalidInput,
            ResolveError::Configuration(_) => ErrorKind::Configuration,
            ResolveError::Evaluator { .. } => ErrorKind::EvaluatorFailure,
            ResolveError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }
}

impl From<SemanticsError> for ResolveError {
    /// Structural engine errors raised outside a permutation are configuration problems
    fn from(err: SemanticsError) -> Self {
        ResolveError::Configuration(err.to_string())
    }
}
