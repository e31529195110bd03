use serde::{Deserialize, Serialize};

use super::defaults;

/// Ground-truth arranger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrangerConfig {
    /// Pass probability of the random gate guarding a top-layer start.
    pub trigger_probability: f64,
    /// Documented per-tick trigger limit. Carried for hosts, not consulted
    /// by the arrangement algorithm.
    pub max_trigger_limit: u32,
    /// Seed of the gate's RNG. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for ArrangerConfig {
    fn default() -> Self {
        Self {
            trigger_probability: defaults::DEFAULT_TRIGGER_PROBABILITY,
            max_trigger_limit: defaults::DEFAULT_MAX_TRIGGER_LIMIT,
            seed: None,
        }
    }
}
