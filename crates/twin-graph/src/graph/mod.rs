//! In-memory graph structures.

pub mod directed_graph;
pub mod reachability;
pub mod situation_graph;
