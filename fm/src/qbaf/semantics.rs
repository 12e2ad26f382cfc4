//! Gradual semantics for quantitative bipolar argumentation
//!
//! A semantics is the pairing of an aggregation function, which folds the
//! current strengths of an argument's attackers and supporters into a single
//! energy value, with an influence function, which moves the argument's
//! initial weight up or down according to that energy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SemanticsError;

/// How attacker and supporter strengths are folded into one energy value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Sum of supporters minus sum of attackers
    Sum,
    /// Probabilistic sum of supporters minus probabilistic sum of attackers
    Product,
    /// Strongest supporter minus strongest attacker
    Top,
}

/// How the energy moves an argument away from its initial weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Influence {
    Linear,
    QuadraticMaximum,
    EulerBased,
    Logistic,
}

/// Supported gradual semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Semantics {
    #[default]
    QuadraticEnergy,
    SquaredDfQuad,
    DfQuad,
    EulerBased,
    EulerBasedTop,
    MlpBased,
}

impl Semantics {
    /// Every supported semantics, in display order
    pub const ALL: [Semantics; 6] = [
        Semantics::QuadraticEnergy,
        Semantics::SquaredDfQuad,
        Semantics::DfQuad,
        Semantics::EulerBased,
        Semantics::EulerBasedTop,
        Semantics::MlpBased,
    ];

    /// Canonical identifier used in configuration files
    pub fn id(&self) -> &'static str {
        match self {
            Semantics::QuadraticEnergy => "QuadraticEnergy_model",
            Semantics::SquaredDfQuad => "SquaredDFQuAD_model",
            Semantics::DfQuad => "DFQuAD_model",
            Semantics::EulerBased => "EulerBased_model",
            Semantics::EulerBasedTop => "EulerBasedTop_model",
            Semantics::MlpBased => "MLPBased_model",
        }
    }

    pub fn aggregation(&self) -> Aggregation {
        match self {
            Semantics::QuadraticEnergy | Semantics::EulerBased | Semantics::MlpBased => Aggregation::Sum,
            Semantics::SquaredDfQuad | Semantics::DfQuad => Aggregation::Product,
            Semantics::EulerBasedTop => Aggregation::Top,
        }
    }

    pub fn influence(&self) -> Influence {
        match self {
            Semantics::QuadraticEnergy | Semantics::SquaredDfQuad => Influence::QuadraticMaximum,
            Semantics::DfQuad => Influence::Linear,
            Semantics::EulerBased | Semantics::EulerBasedTop => Influence::EulerBased,
            Semantics::MlpBased => Influence::Logistic,
        }
    }

    /// Fold attacker and supporter strengths into an energy value
    pub fn aggregate(&self, attackers: &[f64], supporters: &[f64]) -> f64 {
        match self.aggregation() {
            Aggregation::Sum => supporters.iter().sum::<f64>() - attackers.iter().sum::<f64>(),
            Aggregation::Product => {
                let attack = attackers.iter().map(|s| 1.0 - s).product::<f64>();
                let support = supporters.iter().map(|s| 1.0 - s).product::<f64>();
                attack - support
            }
            Aggregation::Top => {
                let strongest = |xs: &[f64]| xs.iter().copied().fold(0.0_f64, f64::max);
                strongest(supporters) - strongest(attackers)
            }
        }
    }

    /// Strength reached from `weight` under `energy`
    pub fn apply(&self, weight: f64, energy: f64) -> f64 {
        match self.influence() {
            Influence::Linear => weight - weight * (-energy).max(0.0) + (1.0 - weight) * energy.max(0.0),
            Influence::QuadraticMaximum => {
                let h = |x: f64| {
                    let x = x.max(0.0);
                    x * x / (1.0 + x * x)
                };
                weight - weight * h(-energy) + (1.0 - weight) * h(energy)
            }
            Influence::EulerBased => 1.0 - (1.0 - weight * weight) / (1.0 + weight * energy.exp()),
            Influence::Logistic => {
                let logit = (weight / (1.0 - weight)).ln();
                1.0 / (1.0 + (-(logit + energy)).exp())
            }
        }
    }
}

impl fmt::Display for Semantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Semantics {
    type Err = SemanticsError;

    /// Accepts canonical ids (`QuadraticEnergy_model`) and relaxed spellings
    /// (`quadratic-energy`, `dfquad`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "Semantics::from_str: called");
        let lowered = s.trim().to_lowercase();
        let normalized: String = lowered
            .strip_suffix("_model")
            .unwrap_or(&lowered)
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "quadraticenergy" => Ok(Semantics::QuadraticEnergy),
            "squareddfquad" => Ok(Semantics::SquaredDfQuad),
            "dfquad" => Ok(Semantics::DfQuad),
            "eulerbased" => Ok(Semantics::EulerBased),
            "eulerbasedtop" => Ok(Semantics::EulerBasedTop),
            "mlpbased" => Ok(Semantics::MlpBased),
            _ => {
                debug!(%s, "Semantics::from_str: unknown semantics");
                Err(SemanticsError::UnknownSemantics(s.to_string()))
            }
        }
    }
}

impl TryFrom<String> for Semantics {
    type Error = SemanticsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Semantics> for String {
    fn from(value: Semantics) -> Self {
        value.id().to_string()
    }
}
