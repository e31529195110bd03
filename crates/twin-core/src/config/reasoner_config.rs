use serde::{Deserialize, Serialize};

use super::defaults;

/// Twin-side reasoner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerConfig {
    /// Threshold applied to situations whose model entry has none.
    pub default_threshold: f64,
    /// Widest junction-tree clique the inference engine accepts.
    pub max_clique_size: usize,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            default_threshold: defaults::DEFAULT_INFERENCE_THRESHOLD,
            max_clique_size: defaults::DEFAULT_MAX_CLIQUE_SIZE,
        }
    }
}
