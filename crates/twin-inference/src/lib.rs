//! # twin-inference
//!
//! Exact probabilistic refinement for the reasoner. The causal relations of a
//! situation graph form a binary Bayesian network with noisy-AND CPTs; the
//! clique structure is compiled once and potentials are rebuilt per query.

pub mod engine;
pub mod factor;
pub mod junction_tree;
pub mod network;

pub use engine::{InferenceEngine, Posteriors};
pub use factor::Factor;
pub use junction_tree::JunctionTree;
pub use network::CausalNetwork;
