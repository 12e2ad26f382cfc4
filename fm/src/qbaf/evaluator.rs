//! Final-strength evaluation
//!
//! Acyclic frameworks are settled exactly: every argument is computed once
//! after all of its parents. Cyclic frameworks are settled by integrating the
//! continuous model `ds/dt = f(w, E(s)) - s` with classic Runge-Kutta steps
//! until the derivative vanishes.

use std::fmt::Debug;
use std::hash::Hash;

use tracing::debug;

use super::{Framework, SemanticsError, SettledFramework};

/// Settles a framework into final strengths
///
/// Implementations must be pure and deterministic: the same framework
/// always yields the same strengths.
pub trait SemanticsEvaluator<A>: Send + Sync {
    fn evaluate(&self, framework: Framework<A>) -> Result<SettledFramework<A>, SemanticsError>;
}

/// Default evaluator: exact for acyclic graphs, RK4 fixed point otherwise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPointEvaluator {
    /// Largest absolute derivative accepted as converged
    pub tolerance: f64,
    /// Integration step size
    pub step: f64,
    /// Integration steps before giving up
    pub max_steps: usize,
}

impl Default for FixedPointEvaluator {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            step: 0.5,
            max_steps: 10_000,
        }
    }
}

impl FixedPointEvaluator {
    /// Final strengths in argument order
    pub fn strengths<A>(&self, framework: &Framework<A>) -> Result<Vec<f64>, SemanticsError>
    where
        A: Clone + Eq + Hash + Debug,
    {
        let (attackers, supporters) = framework.parents();
        let strengths = match framework.topological_order() {
            Some(order) => Self::settle_acyclic(framework, &order, &attackers, &supporters),
            None => self.settle_cyclic(framework, &attackers, &supporters)?,
        };

        if let Some(pos) = strengths.iter().position(|s| !s.is_finite()) {
            return Err(SemanticsError::NonFinite(format!("{:?}", framework.arguments()[pos])));
        }
        Ok(strengths)
    }

    fn settle_acyclic<A>(
        framework: &Framework<A>,
        order: &[usize],
        attackers: &[Vec<usize>],
        supporters: &[Vec<usize>],
    ) -> Vec<f64>
    where
        A: Clone + Eq + Hash + Debug,
    {
        let semantics = framework.semantics();
        let weights = framework.initial_strengths();
        let mut strengths = weights.to_vec();
        let mut att = Vec::new();
        let mut sup = Vec::new();

        for &node in order {
            att.clear();
            att.extend(attackers[node].iter().map(|&p| strengths[p]));
            sup.clear();
            sup.extend(supporters[node].iter().map(|&p| strengths[p]));
            strengths[node] = semantics.apply(weights[node], semantics.aggregate(&att, &sup));
        }

        strengths
    }

    fn settle_cyclic<A>(
        &self,
        framework: &Framework<A>,
        attackers: &[Vec<usize>],
        supporters: &[Vec<usize>],
    ) -> Result<Vec<f64>, SemanticsError>
    where
        A: Clone + Eq + Hash + Debug,
    {
        let semantics = framework.semantics();
        let weights = framework.initial_strengths();
        let n = weights.len();

        let derivative = |state: &[f64], out: &mut [f64]| {
            let mut att = Vec::new();
            let mut sup = Vec::new();
            for i in 0..n {
                att.clear();
                att.extend(attackers[i].iter().map(|&p| state[p]));
                sup.clear();
                sup.extend(supporters[i].iter().map(|&p| state[p]));
                out[i] = semantics.apply(weights[i], semantics.aggregate(&att, &sup)) - state[i];
            }
        };

        let h = self.step;
        let mut state = weights.to_vec();
        let (mut k1, mut k2, mut k3, mut k4) = (vec![0.0; n], vec![0.0; n], vec![0.0; n], vec![0.0; n]);
        let mut stage = vec![0.0; n];
        let mut residual = f64::INFINITY;

        for step in 0..self.max_steps {
            derivative(&state, &mut k1);
            residual = k1.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
            if residual < self.tolerance {
                debug!(step, residual, "FixedPointEvaluator::settle_cyclic: converged");
                return Ok(state);
            }

            for i in 0..n {
                stage[i] = state[i] + 0.5 * h * k1[i];
            }
            derivative(&stage, &mut k2);
            for i in 0..n {
                stage[i] = state[i] + 0.5 * h * k2[i];
            }
            derivative(&stage, &mut k3);
            for i in 0..n {
                stage[i] = state[i] + h * k3[i];
            }
            derivative(&stage, &mut k4);
            for i in 0..n {
                state[i] += h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
            }
        }

        Err(SemanticsError::NotConverged {
            steps: self.max_steps,
            residual,
        })
    }
}

impl<A> SemanticsEvaluator<A> for FixedPointEvaluator
where
    A: Clone + Eq + Hash + Debug + Send + Sync,
{
    fn evaluate(&self, framework: Framework<A>) -> Result<SettledFramework<A>, SemanticsError> {
        debug!(arguments = framework.len(), semantics = %framework.semantics(), "FixedPointEvaluator::evaluate: called");
        let strengths = self.strengths(&framework)?;
        SettledFramework::new(framework, strengths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qbaf::Semantics;

    const EPS: f64 = 1e-9;

    fn s(x: &str) -> String {
        x.to_string()
    }

    fn framework(
        args: &[(&str, f64)],
        attacks: &[(&str, &str)],
        supports: &[(&str, &str)],
        semantics: Semantics,
    ) -> Framework<String> {
        Framework::new(
            args.iter().map(|(a, _)| s(a)).collect(),
            args.iter().map(|(_, w)| *w).collect(),
            attacks.iter().map(|(a, b)| (s(a), s(b))).collect(),
            supports.iter().map(|(a, b)| (s(a), s(b))).collect(),
            semantics,
        )
        .unwrap()
    }

    #[test]
    fn test_isolated_arguments_keep_weight() {
        let fw = framework(&[("a", 0.3), ("b", 0.9)], &[], &[], Semantics::QuadraticEnergy);
        let settled = FixedPointEvaluator::default().evaluate(fw).unwrap();
        assert!((settled.strength(&s("a")).unwrap() - 0.3).abs() < EPS);
        assert!((settled.strength(&s("b")).unwrap() - 0.9).abs() < EPS);
    }

    #[test]
    fn test_chain_is_evaluated_in_dependency_order() {
        // c attacks b, b supports a
        let fw = framework(
            &[("a", 0.5), ("b", 0.5), ("c", 1.0)],
            &[("c", "b")],
            &[("b", "a")],
            Semantics::QuadraticEnergy,
        );
        let settled = FixedPointEvaluator::default().evaluate(fw).unwrap();

        let h = |x: f64| x * x / (1.0 + x * x);
        let b = 0.5 - 0.5 * h(1.0);
        let a = 0.5 + 0.5 * h(b);
        assert!((settled.strength(&s("b")).unwrap() - b).abs() < EPS);
        assert!((settled.strength(&s("a")).unwrap() - a).abs() < EPS);
    }

    #[test]
    fn test_cycle_converges_to_fixed_point() {
        let fw = framework(
            &[("a", 0.6), ("b", 0.4)],
            &[("a", "b")],
            &[("b", "a")],
            Semantics::QuadraticEnergy,
        );
        let evaluator = FixedPointEvaluator::default();
        let settled = evaluator.evaluate(fw).unwrap();
        let a = settled.strength(&s("a")).unwrap();
        let b = settled.strength(&s("b")).unwrap();

        let h = |x: f64| {
            let x = x.max(0.0);
            x * x / (1.0 + x * x)
        };
        // fixed point equations
        assert!((a - (0.6 + 0.4 * h(b))).abs() < 1e-9);
        assert!((b - (0.4 - 0.4 * h(a))).abs() < 1e-9);
        assert!(a > 0.6);
        assert!(b < 0.4);
    }

    #[test]
    fn test_cycle_reports_non_convergence() {
        let fw = framework(
            &[("a", 0.6), ("b", 0.4)],
            &[("a", "b")],
            &[("b", "a")],
            Semantics::QuadraticEnergy,
        );
        let evaluator = FixedPointEvaluator {
            max_steps: 1,
            ..Default::default()
        };
        let err = evaluator.evaluate(fw).unwrap_err();
        assert!(matches!(err, SemanticsError::NotConverged { steps: 1, .. }));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let build = || {
            framework(
                &[("a", 0.5), ("b", 0.2), ("c", 0.7), ("d", 0.1)],
                &[("b", "a"), ("d", "c")],
                &[("c", "a"), ("d", "b")],
                Semantics::DfQuad,
            )
        };
        let evaluator = FixedPointEvaluator::default();
        let first = evaluator.strengths(&build()).unwrap();
        let second = evaluator.strengths(&build()).unwrap();
        assert_eq!(first, second);
    }
}
