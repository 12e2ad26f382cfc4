//! Argumentation engine error types

use thiserror::Error;

/// Errors raised while building or evaluating a framework
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticsError {
    #[error("Unknown semantics: '{0}'")]
    UnknownSemantics(String),

    #[error("Framework has {arguments} arguments but {strengths} initial strengths")]
    LengthMismatch { arguments: usize, strengths: usize },

    #[error("Duplicate argument: {0}")]
    DuplicateArgument(String),

    #[error("Initial strength {value} of argument {argument} is outside [0, 1]")]
    StrengthOutOfRange { argument: String, value: f64 },

    #[error("Relation references unknown argument: {0}")]
    UnknownArgument(String),

    #[error("Argument {0} cannot attack or support itself")]
    SelfRelation(String),

    #[error("Relation {source_arg} -> {target} is both an attack and a support")]
    ConflictingRelation { source_arg: String, target: String },

    #[error("Evaluation did not converge after {steps} steps (residual {residual:e})")]
    NotConverged { steps: usize, residual: f64 },

    #[error("Evaluation produced a non-finite strength for {0}")]
    NonFinite(String),
}
