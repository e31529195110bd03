//! # twin-evolution
//!
//! Two state machines over the same read-only situation graph. The
//! [`SituationArranger`] generates ground-truth occurrences top-down; the
//! [`SituationReasoner`] reconstructs the hierarchy bottom-up from observed
//! operational situations. Each owns its own instance arena.

pub mod arena;
pub mod arranger;
pub mod evolution;
pub mod gate;
pub mod reasoner;

pub use arena::InstanceArena;
pub use arranger::SituationArranger;
pub use evolution::{Evolution, SituationEvolution};
pub use gate::{gate_from_config, AlwaysPass, BernoulliGate, TriggerGate};
pub use reasoner::SituationReasoner;
