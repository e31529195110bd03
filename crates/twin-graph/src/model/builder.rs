//! Programmatic model construction with full validation.
//!
//! The JSON loader converts its document into [`SituationSpec`]s and goes
//! through the same builder, so both paths enforce the same rules.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use twin_core::constants::MAX_CAUSES_PER_SITUATION;
use twin_core::errors::ModelError;
use twin_core::models::{Combination, RelationKind};
use twin_core::{SimTime, SituationId, SituationType};

use crate::graph::directed_graph::DirectedGraph;
use crate::graph::reachability::ReachabilityIndex;
use crate::graph::situation_graph::{Layer, SituationGraph, SituationNode, SituationRelation};

/// A weighted reference to another situation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub id: SituationId,
    pub combination: Combination,
    pub weight: f64,
}

/// Description of one situation before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SituationSpec {
    pub id: SituationId,
    pub kind: SituationType,
    pub duration: SimTime,
    pub cycle: Option<SimTime>,
    pub threshold: Option<f64>,
    pub causes: Vec<Link>,
    pub evidences: Vec<Link>,
}

impl SituationSpec {
    pub fn new(id: SituationId) -> Self {
        Self {
            id,
            kind: SituationType::Normal,
            duration: 0,
            cycle: None,
            threshold: None,
            causes: Vec::new(),
            evidences: Vec::new(),
        }
    }

    pub fn duration(mut self, duration: SimTime) -> Self {
        self.duration = duration;
        self
    }

    pub fn cycle(mut self, cycle: SimTime) -> Self {
        self.cycle = Some(cycle);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.kind = SituationType::Hidden;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Causal predecessor with an AND combination.
    pub fn cause(self, id: SituationId, weight: f64) -> Self {
        self.cause_with(id, Combination::And, weight)
    }

    pub fn cause_with(mut self, id: SituationId, combination: Combination, weight: f64) -> Self {
        self.causes.push(Link {
            id,
            combination,
            weight,
        });
        self
    }

    /// Evidence child with an AND combination.
    pub fn evidence(self, id: SituationId, weight: f64) -> Self {
        self.evidence_with(id, Combination::And, weight)
    }

    pub fn evidence_with(mut self, id: SituationId, combination: Combination, weight: f64) -> Self {
        self.evidences.push(Link {
            id,
            combination,
            weight,
        });
        self
    }
}

/// Collects layers of [`SituationSpec`]s and validates them into a graph.
#[derive(Debug, Clone, Default)]
pub struct SituationGraphBuilder {
    layers: Vec<Vec<SituationSpec>>,
}

impl SituationGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer below the existing ones.
    pub fn layer(mut self, situations: Vec<SituationSpec>) -> Self {
        self.layers.push(situations);
        self
    }

    pub fn push_layer(&mut self, situations: Vec<SituationSpec>) {
        self.layers.push(situations);
    }

    /// Validate and build the immutable graph.
    pub fn build(self) -> Result<SituationGraph, ModelError> {
        if self.layers.is_empty() || self.layers.iter().any(Vec::is_empty) {
            return Err(ModelError::EmptyModel);
        }

        // Pass 1: ordinals and layer membership.
        let mut location: HashMap<SituationId, (usize, usize)> = HashMap::new();
        let mut ordinal = 0;
        for (layer_idx, layer) in self.layers.iter().enumerate() {
            for spec in layer {
                if location.insert(spec.id, (layer_idx, ordinal)).is_some() {
                    return Err(ModelError::DuplicateSituation(spec.id));
                }
                ordinal += 1;
            }
        }
        let size = ordinal;

        // Pass 2: relations, nodes, layer graphs.
        let mut nodes = Vec::with_capacity(size);
        let mut relations = BTreeMap::new();
        let mut edges = Vec::new();
        let mut layers = Vec::with_capacity(self.layers.len());

        for (layer_idx, layer) in self.layers.into_iter().enumerate() {
            let mut graph = DirectedGraph::new();
            for spec in &layer {
                graph.add_vertex(spec.id);
            }

            for spec in layer {
                let (_, index) = location[&spec.id];

                if let Some(value) = spec.threshold {
                    if !(0.0..=1.0).contains(&value) {
                        return Err(ModelError::InvalidThreshold { id: spec.id, value });
                    }
                }

                let mut causes = Vec::with_capacity(spec.causes.len());
                for link in &spec.causes {
                    let &(cause_layer, cause_index) =
                        location
                            .get(&link.id)
                            .ok_or(ModelError::UndefinedReference {
                                from: spec.id,
                                to: link.id,
                            })?;
                    if cause_layer != layer_idx {
                        return Err(ModelError::CrossLayerCause {
                            cause: link.id,
                            effect: spec.id,
                        });
                    }
                    check_weight(link.id, spec.id, link.weight)?;
                    if causes.contains(&link.id) {
                        debug!(cause = link.id, effect = spec.id, "duplicate cause ignored");
                        continue;
                    }
                    causes.push(link.id);
                    relations.insert(
                        (link.id, spec.id),
                        SituationRelation {
                            src: link.id,
                            dest: spec.id,
                            kind: RelationKind::Causal,
                            combination: link.combination,
                            weight: link.weight,
                        },
                    );
                    graph.add_edge(link.id, spec.id);
                    edges.push((cause_index, index));
                }
                if causes.len() > MAX_CAUSES_PER_SITUATION {
                    return Err(ModelError::TooManyCauses {
                        id: spec.id,
                        count: causes.len(),
                        max: MAX_CAUSES_PER_SITUATION,
                    });
                }

                let mut evidences = Vec::with_capacity(spec.evidences.len());
                for link in &spec.evidences {
                    let &(child_layer, child_index) =
                        location
                            .get(&link.id)
                            .ok_or(ModelError::UndefinedReference {
                                from: spec.id,
                                to: link.id,
                            })?;
                    if child_layer <= layer_idx {
                        return Err(ModelError::EvidenceNotBelow {
                            parent: spec.id,
                            child: link.id,
                        });
                    }
                    check_weight(link.id, spec.id, link.weight)?;
                    if evidences.contains(&link.id) {
                        debug!(child = link.id, parent = spec.id, "duplicate evidence ignored");
                        continue;
                    }
                    evidences.push(link.id);
                    relations.insert(
                        (link.id, spec.id),
                        SituationRelation {
                            src: link.id,
                            dest: spec.id,
                            kind: RelationKind::Hierarchical,
                            combination: link.combination,
                            weight: link.weight,
                        },
                    );
                    // Hierarchy is traversable in both directions.
                    edges.push((child_index, index));
                    edges.push((index, child_index));
                }

                nodes.push(SituationNode {
                    id: spec.id,
                    index,
                    layer: layer_idx,
                    causes,
                    evidences,
                    kind: spec.kind,
                    duration: spec.duration,
                    cycle: spec.cycle,
                    threshold: spec.threshold,
                });
            }

            let order = graph.topo_sort().map_err(|id| ModelError::CyclicLayer {
                layer: layer_idx,
                id,
            })?;
            layers.push(Layer { graph, order });
        }

        let reachability = ReachabilityIndex::build(size, edges);
        debug!(
            situations = size,
            layers = layers.len(),
            relations = relations.len(),
            "situation graph built"
        );
        Ok(SituationGraph::from_parts(
            nodes,
            layers,
            relations,
            reachability,
        ))
    }
}

fn check_weight(src: SituationId, dest: SituationId, weight: f64) -> Result<(), ModelError> {
    if (0.0..=1.0).contains(&weight) {
        Ok(())
    } else {
        Err(ModelError::InvalidWeight { src, dest, weight })
    }
}
