//! Binary causal network derived from the causal relations of a situation graph.
//!
//! Nodes get dense local indices in topological order (layer by layer, each
//! layer in its cached order), so parents always precede children.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use twin_core::constants::{MAX_CAUSES_PER_SITUATION, ROOT_PRIOR};
use twin_core::errors::InferenceError;
use twin_core::SituationId;
use twin_graph::SituationGraph;

/// Network over every situation of a graph. Edges are causal relations only.
#[derive(Debug, Clone, Serialize)]
pub struct CausalNetwork {
    ids: Vec<SituationId>,
    local: HashMap<SituationId, usize>,
    ordinal_of_local: Vec<usize>,
    local_of_ordinal: Vec<usize>,
    parents: Vec<Vec<usize>>,
    weights: Vec<Vec<f64>>,
    /// `P(node = 1 | assignment)`, bit `i` of the assignment is `parents[i]`.
    cpts: Vec<Vec<f64>>,
}

impl CausalNetwork {
    pub fn from_graph(graph: &SituationGraph) -> Result<Self, InferenceError> {
        let size = graph.len();

        let mut ordinal_of_local = Vec::with_capacity(size);
        for layer in graph.layers() {
            for id in &layer.order {
                let ordinal = graph
                    .ordinal(*id)
                    .ok_or(InferenceError::UnknownSituation(*id))?;
                ordinal_of_local.push(ordinal);
            }
        }
        let mut local_of_ordinal = vec![0; size];
        for (local, &ordinal) in ordinal_of_local.iter().enumerate() {
            local_of_ordinal[ordinal] = local;
        }

        let nodes = graph.nodes();
        let ids: Vec<SituationId> = ordinal_of_local.iter().map(|&o| nodes[o].id).collect();
        let local: HashMap<SituationId, usize> =
            ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut parents = Vec::with_capacity(size);
        let mut weights = Vec::with_capacity(size);
        let mut cpts = Vec::with_capacity(size);
        let mut edge_count = 0;
        for &ordinal in &ordinal_of_local {
            let node = &nodes[ordinal];
            if node.causes.len() > MAX_CAUSES_PER_SITUATION {
                return Err(InferenceError::TooManyParents {
                    id: node.id,
                    count: node.causes.len(),
                    max: MAX_CAUSES_PER_SITUATION,
                });
            }

            let mut node_parents = Vec::with_capacity(node.causes.len());
            let mut node_weights = Vec::with_capacity(node.causes.len());
            for &cause in &node.causes {
                let parent = *local
                    .get(&cause)
                    .ok_or(InferenceError::UnknownSituation(cause))?;
                let weight = graph
                    .causal_weight(cause, node.id)
                    .ok_or(InferenceError::UnknownSituation(cause))?;
                node_parents.push(parent);
                node_weights.push(weight);
            }
            edge_count += node_parents.len();
            cpts.push(noisy_and(&node_weights));
            parents.push(node_parents);
            weights.push(node_weights);
        }

        debug!(nodes = size, edges = edge_count, "causal network built");
        Ok(Self {
            ids,
            local,
            ordinal_of_local,
            local_of_ordinal,
            parents,
            weights,
            cpts,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, local: usize) -> SituationId {
        self.ids[local]
    }

    pub fn local_index(&self, id: SituationId) -> Option<usize> {
        self.local.get(&id).copied()
    }

    /// Graph ordinal of a local index.
    pub fn ordinal(&self, local: usize) -> usize {
        self.ordinal_of_local[local]
    }

    /// Local index of a graph ordinal.
    pub fn local_of_ordinal(&self, ordinal: usize) -> usize {
        self.local_of_ordinal[ordinal]
    }

    pub fn parents(&self, local: usize) -> &[usize] {
        &self.parents[local]
    }

    pub fn weights(&self, local: usize) -> &[f64] {
        &self.weights[local]
    }

    pub fn edge_count(&self) -> usize {
        self.parents.iter().map(Vec::len).sum()
    }

    /// CPT entry `P(node = value | assignment)`.
    pub fn probability(&self, local: usize, value: bool, assignment: usize) -> f64 {
        let on = self.cpts[local][assignment];
        if value {
            on
        } else {
            1.0 - on
        }
    }

    /// CPT entry by situation ids: `P(id = value | exactly `active` causes on)`.
    pub fn conditional(
        &self,
        id: SituationId,
        value: bool,
        active: &[SituationId],
    ) -> Result<f64, InferenceError> {
        let local = self
            .local_index(id)
            .ok_or(InferenceError::UnknownSituation(id))?;
        let mut assignment = 0;
        for cause in active {
            let parent = self
                .local_index(*cause)
                .ok_or(InferenceError::UnknownSituation(*cause))?;
            let bit = self.parents[local]
                .iter()
                .position(|p| *p == parent)
                .ok_or(InferenceError::UnknownSituation(*cause))?;
            assignment |= 1 << bit;
        }
        Ok(self.probability(local, value, assignment))
    }
}

/// Noisy-AND table: each active cause multiplies in its weight, inactive
/// causes contribute 1. A node without causes gets the root prior.
fn noisy_and(weights: &[f64]) -> Vec<f64> {
    if weights.is_empty() {
        return vec![ROOT_PRIOR];
    }
    (0..1_usize << weights.len())
        .map(|assignment| {
            weights
                .iter()
                .enumerate()
                .filter(|(bit, _)| assignment >> bit & 1 == 1)
                .map(|(_, w)| *w)
                .product::<f64>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noisy_and_rows() {
        let cpt = noisy_and(&[0.3, 0.6]);
        assert_eq!(cpt.len(), 4);
        assert_eq!(cpt[0], 1.0);
        assert!((cpt[0b01] - 0.3).abs() < 1e-12);
        assert!((cpt[0b10] - 0.6).abs() < 1e-12);
        assert!((cpt[0b11] - 0.18).abs() < 1e-12);
    }

    #[test]
    fn root_gets_uniform_prior() {
        assert_eq!(noisy_and(&[]), vec![0.5]);
    }
}
