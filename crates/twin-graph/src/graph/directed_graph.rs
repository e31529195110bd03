//! petgraph `DiGraph` wrapper keyed by situation id.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use twin_core::SituationId;

/// Vertex/edge storage over situation ids with topological ordering.
#[derive(Debug, Clone, Default)]
pub struct DirectedGraph {
    graph: DiGraph<SituationId, ()>,
    node_index: HashMap<SituationId, NodeIndex>,
}

impl DirectedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the vertex for `id`.
    pub fn add_vertex(&mut self, id: SituationId) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(id);
        self.node_index.insert(id, idx);
        idx
    }

    /// Add `src -> dest`, creating missing vertices. Parallel edges are collapsed.
    pub fn add_edge(&mut self, src: SituationId, dest: SituationId) {
        let s = self.add_vertex(src);
        let d = self.add_vertex(dest);
        self.graph.update_edge(s, d, ());
    }

    pub fn contains(&self, id: SituationId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn has_edge(&self, src: SituationId, dest: SituationId) -> bool {
        match (self.node_index.get(&src), self.node_index.get(&dest)) {
            (Some(&s), Some(&d)) => self.graph.contains_edge(s, d),
            _ => false,
        }
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> Vec<SituationId> {
        self.graph.node_weights().copied().collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Topological order of the vertices. Vertices not ordered by an edge
    /// keep their insertion order.
    ///
    /// Returns the id of a vertex on a cycle when the graph is not acyclic.
    pub fn topo_sort(&self) -> Result<Vec<SituationId>, SituationId> {
        toposort(&self.graph, None).map_err(|cycle| self.graph[cycle.node_id()])?;

        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| self.graph.neighbors_directed(idx, Direction::Incoming).count())
            .collect();
        let mut ready: BinaryHeap<Reverse<NodeIndex>> = self
            .graph
            .node_indices()
            .filter(|idx| in_degree[idx.index()] == 0)
            .map(Reverse)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(idx)) = ready.pop() {
            order.push(self.graph[idx]);
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                in_degree[next.index()] -= 1;
                if in_degree[next.index()] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
        Ok(order)
    }
}
