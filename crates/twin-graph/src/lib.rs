//! # twin-graph
//!
//! The situation model. A layered DAG (layer 0 on top, operational
//! situations at the bottom) with causal edges inside a layer, evidence edges
//! between layers, a relation table, and a reachability index built once at
//! load. Immutable after construction and shared by every engine.

pub mod graph;
pub mod model;

pub use graph::directed_graph::DirectedGraph;
pub use graph::reachability::ReachabilityIndex;
pub use graph::situation_graph::{Layer, SituationGraph, SituationNode, SituationRelation};
pub use model::builder::{Link, SituationGraphBuilder, SituationSpec};
pub use model::document::ModelDocument;
pub use model::loader::{load_model, load_model_str};
