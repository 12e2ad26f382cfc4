//! Resolver configuration

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Semantics identifier, e.g. `QuadraticEnergy_model`
    #[serde(default = "default_semantics")]
    pub semantics: String,

    /// Number of sampled orderings per resolution (at least 1)
    #[serde(default = "default_permutations")]
    pub permutations: usize,

    /// Sampler seed; omitted means a fresh seed per resolver
    #[serde(default)]
    pub seed: Option<u64>,

    /// Worker threads used to evaluate permutations (1 = sequential)
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_semantics() -> String {
    debug!("default_semantics: called");
    "QuadraticEnergy_model".to_string()
}

fn default_permutations() -> usize {
    debug!("default_permutations: called");
    64
}

fn default_parallelism() -> usize {
    debug!("default_parallelism: called");
    1
}

impl Default for ResolverConfig {
    fn default() -> Self {
        debug!("ResolverConfig::default: called");
        Self {
            semantics: default_semantics(),
            permutations: default_permutations(),
            seed: None,
            parallelism: default_parallelism(),
        }
    }
}

impl ResolverConfig {
    /// Configuration with a fixed seed, for reproducible runs
    pub fn seeded(seed: u64, permutations: usize) -> Self {
        Self {
            seed: Some(seed),
            permutations,
            ..Default::default()
        }
    }
}
