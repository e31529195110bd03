//! The layered situation graph: nodes, relation table, per-layer causal
//! graphs, and the reachability index.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use twin_core::models::{Combination, RelationKind};
use twin_core::{SimTime, SituationId, SituationInstance, SituationType};

use super::directed_graph::DirectedGraph;
use super::reachability::ReachabilityIndex;

/// A situation in the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SituationNode {
    pub id: SituationId,
    /// Dense ordinal across all layers, in load order.
    pub index: usize,
    /// Layer holding the node, 0 = top.
    pub layer: usize,
    /// Explicit causal predecessors, same layer.
    pub causes: Vec<SituationId>,
    /// Children in the part-of hierarchy, deeper layers.
    pub evidences: Vec<SituationId>,
    pub kind: SituationType,
    pub duration: SimTime,
    pub cycle: Option<SimTime>,
    /// Model-level inference threshold; `None` defers to configuration.
    pub threshold: Option<f64>,
}

impl SituationNode {
    /// Fresh runtime instance for an engine.
    pub fn instance(&self, default_threshold: f64) -> SituationInstance {
        SituationInstance::new(
            self.id,
            self.kind,
            self.duration,
            self.cycle,
            self.threshold.unwrap_or(default_threshold),
        )
    }

    pub fn is_root_cause(&self) -> bool {
        self.causes.is_empty()
    }
}

/// A directed, weighted relation between two situations.
///
/// Causal: `src` is the cause, `dest` the effect.
/// Hierarchical: `src` is the evidence child, `dest` the parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SituationRelation {
    pub src: SituationId,
    pub dest: SituationId,
    pub kind: RelationKind,
    pub combination: Combination,
    pub weight: f64,
}

/// One layer: its members and the causal graph among them.
#[derive(Debug, Clone)]
pub struct Layer {
    pub graph: DirectedGraph,
    /// Topological order of `graph`, cached at load.
    pub order: Vec<SituationId>,
}

impl Layer {
    pub fn contains(&self, id: SituationId) -> bool {
        self.graph.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// The situation model. Read-only after construction.
#[derive(Debug, Clone)]
pub struct SituationGraph {
    nodes: Vec<SituationNode>,
    node_index: HashMap<SituationId, usize>,
    layers: Vec<Layer>,
    relations: BTreeMap<(SituationId, SituationId), SituationRelation>,
    reachability: ReachabilityIndex,
    /// Operational strict causes of every operational situation.
    strict_causes: HashMap<SituationId, Vec<SituationId>>,
}

impl SituationGraph {
    /// Assemble a graph from validated parts. Used by the builder.
    pub(crate) fn from_parts(
        nodes: Vec<SituationNode>,
        layers: Vec<Layer>,
        relations: BTreeMap<(SituationId, SituationId), SituationRelation>,
        reachability: ReachabilityIndex,
    ) -> Self {
        let node_index = nodes.iter().map(|n| (n.id, n.index)).collect();
        let mut graph = Self {
            nodes,
            node_index,
            layers,
            relations,
            reachability,
            strict_causes: HashMap::new(),
        };

        let operational = graph.all_operational_situations();
        let mut strict_causes = HashMap::with_capacity(operational.len());
        for &op in &operational {
            let causes = operational
                .iter()
                .copied()
                .filter(|&op2| op2 != op && graph.strict_cause(op2, op))
                .collect();
            strict_causes.insert(op, causes);
        }
        graph.strict_causes = strict_causes;
        graph
    }

    /// Number of layers.
    pub fn height(&self) -> usize {
        self.layers.len()
    }

    /// Number of situations.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn top_layer(&self) -> &Layer {
        &self.layers[0]
    }

    pub fn bottom_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// Index of the bottom layer.
    pub fn bottom_index(&self) -> usize {
        self.layers.len() - 1
    }

    pub fn node(&self, id: SituationId) -> Option<&SituationNode> {
        self.node_index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Nodes ordered by ordinal.
    pub fn nodes(&self) -> &[SituationNode] {
        &self.nodes
    }

    /// Dense ordinal of `id`.
    pub fn ordinal(&self, id: SituationId) -> Option<usize> {
        self.node_index.get(&id).copied()
    }

    pub fn relation(&self, src: SituationId, dest: SituationId) -> Option<&SituationRelation> {
        self.relations.get(&(src, dest))
    }

    pub fn relations(&self) -> impl Iterator<Item = &SituationRelation> {
        self.relations.values()
    }

    /// Causal strength of `cause -> effect`, if that causal relation exists.
    pub fn causal_weight(&self, cause: SituationId, effect: SituationId) -> Option<f64> {
        self.relation(cause, effect)
            .filter(|r| r.kind == RelationKind::Causal)
            .map(|r| r.weight)
    }

    pub fn reachability(&self) -> &ReachabilityIndex {
        &self.reachability
    }

    /// Whether a path of length >= 1 leads from `src` to `dest`.
    pub fn is_reachable(&self, src: SituationId, dest: SituationId) -> bool {
        match (self.ordinal(src), self.ordinal(dest)) {
            (Some(i), Some(j)) => self.reachability.reachable(i, j),
            _ => false,
        }
    }

    /// `cause` influences `effect` with no path back.
    pub fn strict_cause(&self, cause: SituationId, effect: SituationId) -> bool {
        self.is_reachable(cause, effect) && !self.is_reachable(effect, cause)
    }

    pub fn is_operational(&self, id: SituationId) -> bool {
        self.bottom_layer().contains(id)
    }

    /// Bottom-layer situations governed by `top_id`: the leaves of its
    /// evidence tree, depth first, without duplicates.
    pub fn operational_situations(&self, top_id: SituationId) -> Vec<SituationId> {
        let mut result = Vec::new();
        let Some(top) = self.node(top_id) else {
            return result;
        };

        let mut seen = HashSet::new();
        let mut stack = vec![top];
        while let Some(node) = stack.pop() {
            if node.evidences.is_empty() {
                if self.is_operational(node.id) && seen.insert(node.id) {
                    result.push(node.id);
                }
                continue;
            }
            for evidence in &node.evidences {
                if let Some(child) = self.node(*evidence) {
                    stack.push(child);
                }
            }
        }
        result
    }

    /// Every bottom-layer situation in topological order.
    pub fn all_operational_situations(&self) -> Vec<SituationId> {
        self.bottom_layer().order.clone()
    }

    /// Operational strict causes of operational situation `op`.
    pub fn strict_causes_of(&self, op: SituationId) -> &[SituationId] {
        self.strict_causes.get(&op).map(Vec::as_slice).unwrap_or(&[])
    }
}
