//! Gradient-based argument contributions
//!
//! The contribution of an argument `x` to a topic `t` is the partial
//! derivative of the final strength of `t` with respect to the initial
//! strength of `x`, estimated by a finite difference that stays inside
//! [0, 1]. The perturbed framework is settled by the same evaluator that
//! settled the original one.

use std::fmt::Debug;
use std::hash::Hash;

use tracing::debug;

use super::{SemanticsError, SemanticsEvaluator, SettledFramework};

/// Signed sensitivity of a topic argument to a set of query arguments
pub trait InfluenceOracle<A>: Send + Sync {
    /// `evaluator` must be the evaluator that produced `settled`
    fn influence(
        &self,
        evaluator: &dyn SemanticsEvaluator<A>,
        settled: &SettledFramework<A>,
        target: &A,
        query: &[A],
    ) -> Result<Vec<(A, f64)>, SemanticsError>;
}

/// Finite-difference gradient of final strength over initial strength
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientOracle {
    delta: f64,
}

impl Default for GradientOracle {
    fn default() -> Self {
        Self { delta: 1e-6 }
    }
}

impl GradientOracle {
    pub fn new(delta: f64) -> Self {
        Self { delta }
    }

    /// Partial derivative of `target`'s final strength w.r.t. the weight at `position`
    fn partial<A>(
        &self,
        evaluator: &dyn SemanticsEvaluator<A>,
        settled: &SettledFramework<A>,
        target: usize,
        position: usize,
    ) -> Result<f64, SemanticsError>
    where
        A: Clone + Eq + Hash + Debug,
    {
        let framework = settled.framework();
        let weight = framework.initial_strengths()[position];
        let nudged = if weight + self.delta <= 1.0 {
            weight + self.delta
        } else {
            weight - self.delta
        };

        let perturbed = evaluator.evaluate(framework.with_initial_strength(position, nudged))?;
        let moved = perturbed.strengths_by_position()[target];
        let base = settled.strengths_by_position()[target];
        Ok((moved - base) / (nudged - weight))
    }
}

impl<A> InfluenceOracle<A> for GradientOracle
where
    A: Clone + Eq + Hash + Debug + Send + Sync,
{
    fn influence(
        &self,
        evaluator: &dyn SemanticsEvaluator<A>,
        settled: &SettledFramework<A>,
        target: &A,
        query: &[A],
    ) -> Result<Vec<(A, f64)>, SemanticsError> {
        debug!(?target, query = query.len(), "GradientOracle::influence: called");
        let framework = settled.framework();
        let target_pos = framework
            .position(target)
            .ok_or_else(|| SemanticsError::UnknownArgument(format!("{:?}", target)))?;

        query
            .iter()
            .map(|argument| {
                let pos = framework
                    .position(argument)
                    .ok_or_else(|| SemanticsError::UnknownArgument(format!("{:?}", argument)))?;
                let gradient = self.partial(evaluator, settled, target_pos, pos)?;
                Ok((argument.clone(), gradient))
            })
            .collect()
    }
}
