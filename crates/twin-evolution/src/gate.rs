//! Random admission gate consulted before a top situation starts.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use twin_core::config::ArrangerConfig;
use twin_core::SituationId;

pub trait TriggerGate: Send {
    /// Whether `id` may start now.
    fn pass(&mut self, id: SituationId) -> bool;
}

/// Admits every start.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysPass;

impl TriggerGate for AlwaysPass {
    fn pass(&mut self, _id: SituationId) -> bool {
        true
    }
}

/// Admits each start independently with a fixed probability.
#[derive(Debug, Clone)]
pub struct BernoulliGate {
    probability: f64,
    rng: StdRng,
}

impl BernoulliGate {
    /// Without a seed the generator is seeded from the thread RNG.
    pub fn new(probability: f64, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().next_u64());
        Self {
            probability: probability.clamp(0.0, 1.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl TriggerGate for BernoulliGate {
    fn pass(&mut self, _id: SituationId) -> bool {
        self.rng.gen_bool(self.probability)
    }
}

/// Gate for the configured pass probability.
pub fn gate_from_config(config: &ArrangerConfig) -> Box<dyn TriggerGate> {
    if config.trigger_probability >= 1.0 {
        Box::new(AlwaysPass)
    } else {
        Box::new(BernoulliGate::new(config.trigger_probability, config.seed))
    }
}
