//! The inference engine used by the reasoner's refinement stage.

use std::sync::Arc;

use tracing::debug;

use twin_core::constants::ROOT_PRIOR;
use twin_core::errors::InferenceError;
use twin_core::SituationId;
use twin_graph::SituationGraph;

use crate::junction_tree::JunctionTree;
use crate::network::CausalNetwork;

/// Compiled causal network for one situation graph.
///
/// Construction builds the CPTs and the clique structure once. Every call to
/// [`InferenceEngine::infer`] rebuilds the potentials from the supplied
/// evidence, so results depend only on that evidence.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    graph: Arc<SituationGraph>,
    network: CausalNetwork,
    tree: JunctionTree,
    /// No-evidence marginals, indexed by local index.
    prior: Vec<f64>,
}

impl InferenceEngine {
    pub fn new(graph: Arc<SituationGraph>, max_clique_size: usize) -> Result<Self, InferenceError> {
        let network = CausalNetwork::from_graph(&graph)?;
        let tree = JunctionTree::compile(&network, max_clique_size)?;
        let prior = tree
            .marginals(&vec![None; network.len()])
            .into_iter()
            .map(|p| p.unwrap_or(ROOT_PRIOR))
            .collect();
        Ok(Self {
            graph,
            network,
            tree,
            prior,
        })
    }

    pub fn network(&self) -> &CausalNetwork {
        &self.network
    }

    pub fn junction_tree(&self) -> &JunctionTree {
        &self.tree
    }

    /// `P(id = 1)` with no evidence.
    pub fn prior(&self, id: SituationId) -> Option<f64> {
        self.network.local_index(id).map(|local| self.prior[local])
    }

    /// Posterior `P(node = 1 | evidence)` for every node without evidence.
    ///
    /// `evidence` is indexed by graph ordinal: `Some(true)` for triggered
    /// situations, `Some(false)` for untriggered ones and `None` for the
    /// undetermined ones to query. When the evidence is impossible within a
    /// node's component, that node's prior is returned instead.
    pub fn infer(&self, evidence: &[Option<bool>]) -> Result<Posteriors, InferenceError> {
        if evidence.len() != self.network.len() {
            return Err(InferenceError::EvidenceShape {
                expected: self.network.len(),
                got: evidence.len(),
            });
        }

        let local_evidence: Vec<Option<bool>> = (0..self.network.len())
            .map(|local| evidence[self.network.ordinal(local)])
            .collect();
        let marginals = self.tree.marginals(&local_evidence);

        let mut values = vec![None; evidence.len()];
        let mut degenerate = 0;
        for (ordinal, value) in evidence.iter().enumerate() {
            if value.is_some() {
                continue;
            }
            let local = self.network.local_of_ordinal(ordinal);
            let posterior = marginals[local].unwrap_or_else(|| {
                degenerate += 1;
                self.prior[local]
            });
            values[ordinal] = Some(posterior);
        }

        let queried = values.iter().filter(|v| v.is_some()).count();
        debug!(
            queried,
            observed = evidence.len() - queried,
            degenerate,
            "inference complete"
        );
        Ok(Posteriors {
            graph: Arc::clone(&self.graph),
            values,
        })
    }
}

/// Query results keyed by graph ordinal.
#[derive(Debug, Clone)]
pub struct Posteriors {
    graph: Arc<SituationGraph>,
    values: Vec<Option<f64>>,
}

impl Posteriors {
    /// Posterior at `ordinal`, `None` if that node carried evidence.
    pub fn at(&self, ordinal: usize) -> Option<f64> {
        self.values.get(ordinal).copied().flatten()
    }

    pub fn get(&self, id: SituationId) -> Option<f64> {
        self.graph.ordinal(id).and_then(|o| self.at(o))
    }

    /// `(id, posterior)` for every queried node, in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (SituationId, f64)> + '_ {
        self.graph
            .nodes()
            .iter()
            .zip(&self.values)
            .filter_map(|(node, value)| value.map(|p| (node.id, p)))
    }

    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
