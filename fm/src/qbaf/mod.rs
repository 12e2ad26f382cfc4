//! Quantitative bipolar argumentation engine
//!
//! Frameworks of weighted arguments linked by attack and support relations,
//! a family of gradual semantics to settle them, and a gradient oracle that
//! measures how much one argument's weight moves another's final strength.

mod error;
mod evaluator;
mod framework;
mod gradient;
mod semantics;

pub use error::SemanticsError;
pub use evaluator::{FixedPointEvaluator, SemanticsEvaluator};
pub use framework::{Framework, SettledFramework};
pub use gradient::{GradientOracle, InfluenceOracle};
pub use semantics::{Aggregation, Influence, Semantics};
