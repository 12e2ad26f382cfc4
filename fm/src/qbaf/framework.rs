//! Quantitative bipolar argumentation frameworks
//!
//! A framework is a set of arguments, each with an initial strength in
//! [0, 1], connected by directed attack and support relations. Arguments are
//! generic labels; internally every relation is stored by position so that
//! evaluation works on plain vectors.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::{Debug, Display, Write as _};
use std::hash::Hash;

use tracing::debug;

use super::{Semantics, SemanticsError};

/// A validated argumentation framework
#[derive(Debug, Clone)]
pub struct Framework<A> {
    arguments: Vec<A>,
    index: HashMap<A, usize>,
    initial_strengths: Vec<f64>,
    attacks: Vec<(usize, usize)>,
    supports: Vec<(usize, usize)>,
    semantics: Semantics,
}

impl<A> Framework<A>
where
    A: Clone + Eq + Hash + Debug,
{
    /// Build and validate a framework
    ///
    /// Arguments must be unique and every strength must lie in [0, 1].
    /// Relations must connect two distinct known arguments, and no pair may
    /// be both an attack and a support. Repeated relations are collapsed.
    pub fn new(
        arguments: Vec<A>,
        initial_strengths: Vec<f64>,
        attacks: Vec<(A, A)>,
        supports: Vec<(A, A)>,
        semantics: Semantics,
    ) -> Result<Self, SemanticsError> {
        debug!(
            arguments = arguments.len(),
            attacks = attacks.len(),
            supports = supports.len(),
            %semantics,
            "Framework::new: called"
        );

        if arguments.len() != initial_strengths.len() {
            return Err(SemanticsError::LengthMismatch {
                arguments: arguments.len(),
                strengths: initial_strengths.len(),
            });
        }

        let mut index = HashMap::with_capacity(arguments.len());
        for (pos, (argument, strength)) in arguments.iter().zip(&initial_strengths).enumerate() {
            if index.insert(argument.clone(), pos).is_some() {
                return Err(SemanticsError::DuplicateArgument(format!("{:?}", argument)));
            }
            if !strength.is_finite() || !(0.0..=1.0).contains(strength) {
                return Err(SemanticsError::StrengthOutOfRange {
                    argument: format!("{:?}", argument),
                    value: *strength,
                });
            }
        }

        let attacks = Self::resolve_relations(&index, attacks)?;
        let supports = Self::resolve_relations(&index, supports)?;

        let attack_set: HashSet<_> = attacks.iter().copied().collect();
        if let Some(&(source, target)) = supports.iter().find(|pair| attack_set.contains(pair)) {
            return Err(SemanticsError::ConflictingRelation {
                source_arg: format!("{:?}", arguments[source]),
                target: format!("{:?}", arguments[target]),
            });
        }

        Ok(Self {
            arguments,
            index,
            initial_strengths,
            attacks,
            supports,
            semantics,
        })
    }

    fn resolve_relations(
        index: &HashMap<A, usize>,
        relations: Vec<(A, A)>,
    ) -> Result<Vec<(usize, usize)>, SemanticsError> {
        let mut seen = HashSet::with_capacity(relations.len());
        let mut resolved = Vec::with_capacity(relations.len());

        for (source, target) in relations {
            let s = *index
                .get(&source)
                .ok_or_else(|| SemanticsError::UnknownArgument(format!("{:?}", source)))?;
            let t = *index
                .get(&target)
                .ok_or_else(|| SemanticsError::UnknownArgument(format!("{:?}", target)))?;
            if s == t {
                return Err(SemanticsError::SelfRelation(format!("{:?}", source)));
            }
            if seen.insert((s, t)) {
                resolved.push((s, t));
            }
        }

        Ok(resolved)
    }

    pub fn arguments(&self) -> &[A] {
        &self.arguments
    }

    pub fn initial_strengths(&self) -> &[f64] {
        &self.initial_strengths
    }

    pub fn semantics(&self) -> Semantics {
        self.semantics
    }

    /// Position of an argument in the framework
    pub fn position(&self, argument: &A) -> Option<usize> {
        self.index.get(argument).copied()
    }

    pub fn initial_strength(&self, argument: &A) -> Option<f64> {
        self.position(argument).map(|pos| self.initial_strengths[pos])
    }

    /// Attack relations as (attacker, attacked) label pairs
    pub fn attacks(&self) -> impl Iterator<Item = (&A, &A)> {
        self.attacks
            .iter()
            .map(|&(s, t)| (&self.arguments[s], &self.arguments[t]))
    }

    /// Support relations as (supporter, supported) label pairs
    pub fn supports(&self) -> impl Iterator<Item = (&A, &A)> {
        self.supports
            .iter()
            .map(|&(s, t)| (&self.arguments[s], &self.arguments[t]))
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Copy of this framework with one initial strength replaced
    ///
    /// Skips range validation so finite-difference steps can step just past
    /// a weight; callers keep the value within [0, 1].
    pub(crate) fn with_initial_strength(&self, position: usize, value: f64) -> Self {
        let mut copy = self.clone();
        copy.initial_strengths[position] = value;
        copy
    }

    /// Attackers and supporters of every argument, by position
    pub(crate) fn parents(&self) -> (Vec<Vec<usize>>, Vec<Vec<usize>>) {
        let mut attackers = vec![Vec::new(); self.arguments.len()];
        let mut supporters = vec![Vec::new(); self.arguments.len()];
        for &(s, t) in &self.attacks {
            attackers[t].push(s);
        }
        for &(s, t) in &self.supports {
            supporters[t].push(s);
        }
        (attackers, supporters)
    }

    /// Evaluation order where every argument follows all of its parents,
    /// or `None` when the relations contain a cycle
    pub(crate) fn topological_order(&self) -> Option<Vec<usize>> {
        let n = self.arguments.len();
        let mut in_degree = vec![0usize; n];
        let mut children = vec![Vec::new(); n];
        for &(s, t) in self.attacks.iter().chain(&self.supports) {
            in_degree[t] += 1;
            children[s].push(t);
        }

        let mut ready: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(node) = ready.pop_front() {
            order.push(node);
            for &child in &children[node] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    ready.push_back(child);
                }
            }
        }

        if order.len() == n {
            Some(order)
        } else {
            debug!(resolved = order.len(), total = n, "Framework::topological_order: cycle detected");
            None
        }
    }
}

/// A framework together with the final strength of every argument
#[derive(Debug, Clone)]
pub struct SettledFramework<A> {
    framework: Framework<A>,
    final_strengths: Vec<f64>,
}

impl<A> SettledFramework<A>
where
    A: Clone + Eq + Hash + Debug,
{
    /// Pair a framework with the final strengths an evaluator computed for it
    ///
    /// `final_strengths` is in argument order and must have one finite entry
    /// per argument.
    pub fn new(framework: Framework<A>, final_strengths: Vec<f64>) -> Result<Self, SemanticsError> {
        if final_strengths.len() != framework.len() {
            return Err(SemanticsError::LengthMismatch {
                arguments: framework.len(),
                strengths: final_strengths.len(),
            });
        }
        if let Some(pos) = final_strengths.iter().position(|s| !s.is_finite()) {
            return Err(SemanticsError::NonFinite(format!("{:?}", framework.arguments[pos])));
        }
        Ok(Self {
            framework,
            final_strengths,
        })
    }

    pub fn framework(&self) -> &Framework<A> {
        &self.framework
    }

    /// Final strength of one argument
    pub fn strength(&self, argument: &A) -> Option<f64> {
        self.framework.position(argument).map(|pos| self.final_strengths[pos])
    }

    /// Final strengths in argument order
    pub fn final_strengths(&self) -> impl Iterator<Item = (&A, f64)> {
        self.framework
            .arguments
            .iter()
            .zip(self.final_strengths.iter().copied())
    }

    pub(crate) fn strengths_by_position(&self) -> &[f64] {
        &self.final_strengths
    }
}

impl<A> SettledFramework<A>
where
    A: Clone + Eq + Hash + Debug + Display,
{
    /// Graphviz DOT rendering of the settled framework
    ///
    /// Each node shows the argument with its initial weight `w` and final
    /// strength `s` to three decimals. Attacks are red with a flat head,
    /// supports green.
    pub fn to_dot(&self) -> String {
        let framework = &self.framework;
        let mut out = String::from("digraph qbaf {\n    rankdir=BT;\n    node [shape=box];\n");

        for (pos, argument) in framework.arguments.iter().enumerate() {
            let _ = writeln!(
                out,
                "    n{} [label=\"{}\\nw={:.3} s={:.3}\"];",
                pos,
                escape_dot(&argument.to_string()),
                framework.initial_strengths[pos],
                self.final_strengths[pos]
            );
        }
        for &(source, target) in &framework.attacks {
            let _ = writeln!(out, "    n{} -> n{} [color=red, arrowhead=tee];", source, target);
        }
        for &(source, target) in &framework.supports {
            let _ = writeln!(out, "    n{} -> n{} [color=darkgreen];", source, target);
        }

        out.push_str("}\n");
        out
    }
}

fn escape_dot(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn pair(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn test_new_valid_framework() {
        let fw = Framework::new(
            labels(&["a", "b", "c"]),
            vec![0.5, 0.2, 1.0],
            vec![pair("b", "a")],
            vec![pair("c", "a"), pair("c", "a")],
            Semantics::QuadraticEnergy,
        )
        .unwrap();

        assert_eq!(fw.len(), 3);
        assert_eq!(fw.attacks().count(), 1);
        // duplicate support collapsed
        assert_eq!(fw.supports().count(), 1);
        assert_eq!(fw.initial_strength(&"b".to_string()), Some(0.2));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let err = Framework::<String>::new(labels(&["a"]), vec![], vec![], vec![], Semantics::default()).unwrap_err();
        assert!(matches!(err, SemanticsError::LengthMismatch { .. }));
    }

    #[test]
    fn test_rejects_duplicate_argument() {
        let err =
            Framework::new(labels(&["a", "a"]), vec![0.1, 0.2], vec![], vec![], Semantics::default()).unwrap_err();
        assert!(matches!(err, SemanticsError::DuplicateArgument(_)));
    }

    #[test]
    fn test_rejects_out_of_range_strength() {
        let err = Framework::new(labels(&["a"]), vec![1.5], vec![], vec![], Semantics::default()).unwrap_err();
        assert!(matches!(err, SemanticsError::StrengthOutOfRange { .. }));

        let err = Framework::new(labels(&["a"]), vec![f64::NAN], vec![], vec![], Semantics::default()).unwrap_err();
        assert!(matches!(err, SemanticsError::StrengthOutOfRange { .. }));
    }

    #[test]
    fn test_rejects_unknown_and_self_relations() {
        let err = Framework::new(
            labels(&["a"]),
            vec![0.5],
            vec![pair("a", "z")],
            vec![],
            Semantics::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SemanticsError::UnknownArgument(_)));

        let err = Framework::new(
            labels(&["a"]),
            vec![0.5],
            vec![],
            vec![pair("a", "a")],
            Semantics::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SemanticsError::SelfRelation(_)));
    }

    #[test]
    fn test_rejects_conflicting_relation() {
        let err = Framework::new(
            labels(&["a", "b"]),
            vec![0.5, 0.5],
            vec![pair("a", "b")],
            vec![pair("a", "b")],
            Semantics::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SemanticsError::ConflictingRelation { .. }));
    }

    #[test]
    fn test_topological_order_and_cycles() {
        let chain = Framework::new(
            labels(&["a", "b", "c"]),
            vec![0.5; 3],
            vec![pair("c", "b")],
            vec![pair("b", "a")],
            Semantics::default(),
        )
        .unwrap();
        assert_eq!(chain.topological_order(), Some(vec![2, 1, 0]));

        let cycle = Framework::new(
            labels(&["a", "b"]),
            vec![0.5; 2],
            vec![pair("a", "b")],
            vec![pair("b", "a")],
            Semantics::default(),
        )
        .unwrap();
        assert_eq!(cycle.topological_order(), None);
    }

    #[test]
    fn test_settled_framework_checks_strengths() {
        let fw = Framework::new(labels(&["a", "b"]), vec![0.5, 0.5], vec![], vec![], Semantics::default()).unwrap();

        let err = SettledFramework::new(fw.clone(), vec![0.5]).unwrap_err();
        assert!(matches!(err, SemanticsError::LengthMismatch { arguments: 2, strengths: 1 }));

        let err = SettledFramework::new(fw.clone(), vec![0.5, f64::INFINITY]).unwrap_err();
        assert!(matches!(err, SemanticsError::NonFinite(_)));

        let settled = SettledFramework::new(fw, vec![0.25, 0.75]).unwrap();
        assert_eq!(settled.strength(&"b".to_string()), Some(0.75));
    }

    #[test]
    fn test_to_dot_lists_nodes_and_relations() {
        let fw = Framework::new(
            labels(&["t", "x", "say \"hi\""]),
            vec![0.5, 0.6, 0.2],
            vec![pair("say \"hi\"", "t")],
            vec![pair("x", "t")],
            Semantics::default(),
        )
        .unwrap();
        let settled = SettledFramework::new(fw, vec![0.61234, 0.6, 0.2]).unwrap();
        let dot = settled.to_dot();

        assert!(dot.starts_with("digraph qbaf {"));
        assert!(dot.trim_end().ends_with('}'));
        assert!(dot.contains(r#"n0 [label="t\nw=0.500 s=0.612"];"#));
        assert!(dot.contains(r#"n2 [label="say \"hi\"\nw=0.200 s=0.200"];"#));
        assert!(dot.contains("n2 -> n0 [color=red, arrowhead=tee];"));
        assert!(dot.contains("n1 -> n0 [color=darkgreen];"));
    }
}
