//! Junction-tree compilation and Shafer-Shenoy propagation.
//!
//! Compilation depends only on the network: moralize, triangulate by greedy
//! min-fill elimination, keep the maximal cliques, join them with a
//! maximum-weight spanning forest over separator sizes, and assign each
//! family to a covering clique. Evidence only enters through the potentials.

use std::collections::{BTreeSet, HashMap};

use petgraph::unionfind::UnionFind;
use serde::Serialize;
use tracing::debug;

use twin_core::errors::InferenceError;

use crate::factor::Factor;
use crate::network::CausalNetwork;

#[derive(Debug, Clone, Serialize)]
pub struct JunctionTree {
    cliques: Vec<Vec<usize>>,
    neighbors: Vec<Vec<usize>>,
    separators: HashMap<(usize, usize), Vec<usize>>,
    /// Parent of every clique in its tree, `None` for roots.
    parent: Vec<Option<usize>>,
    /// Preorder over all trees; parents precede children.
    schedule: Vec<usize>,
    /// Clique holding each variable's family.
    home: Vec<usize>,
    families: Vec<Factor>,
}

impl JunctionTree {
    pub fn compile(network: &CausalNetwork, max_clique_size: usize) -> Result<Self, InferenceError> {
        let moral = moralize(network);
        let cliques = maximal_cliques(triangulate(moral));

        if let Some(largest) = cliques.iter().map(Vec::len).max() {
            if largest > max_clique_size {
                return Err(InferenceError::CliqueTooLarge {
                    size: largest,
                    max: max_clique_size,
                });
            }
        }

        let (neighbors, separators) = spanning_forest(&cliques);
        let (parent, schedule) = root_trees(&neighbors);

        let mut home = Vec::with_capacity(network.len());
        let mut families = Vec::with_capacity(network.len());
        for node in 0..network.len() {
            let family = Factor::family(network, node);
            let clique = cliques
                .iter()
                .position(|c| is_subset(family.vars(), c))
                .ok_or(InferenceError::UncoveredFamily(network.id(node)))?;
            home.push(clique);
            families.push(family);
        }

        let tree = Self {
            cliques,
            neighbors,
            separators,
            parent,
            schedule,
            home,
            families,
        };
        debug!(
            cliques = tree.cliques.len(),
            largest = tree.largest_clique(),
            trees = tree.tree_count(),
            "junction tree compiled"
        );
        Ok(tree)
    }

    pub fn cliques(&self) -> &[Vec<usize>] {
        &self.cliques
    }

    pub fn largest_clique(&self) -> usize {
        self.cliques.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Number of disconnected trees in the forest.
    pub fn tree_count(&self) -> usize {
        self.parent.iter().filter(|p| p.is_none()).count()
    }

    /// `P(v = 1 | evidence)` for every variable, indexed by local index.
    /// `None` where the evidence has zero probability in that variable's tree.
    pub fn marginals(&self, evidence: &[Option<bool>]) -> Vec<Option<f64>> {
        let mut potentials: Vec<Factor> = self
            .cliques
            .iter()
            .map(|c| Factor::unit(c.clone()))
            .collect();
        for (node, family) in self.families.iter().enumerate() {
            let clique = self.home[node];
            potentials[clique] = potentials[clique].product(family);
        }
        for (node, value) in evidence.iter().enumerate() {
            if let Some(value) = value {
                potentials[self.home[node]].observe(node, *value);
            }
        }

        let beliefs = self.propagate(&potentials);
        (0..self.home.len())
            .map(|node| {
                let marginal = beliefs[self.home[node]].marginalize(&[node]);
                let total = marginal.total();
                if total > 0.0 && total.is_finite() {
                    Some(marginal.values()[1] / total)
                } else {
                    None
                }
            })
            .collect()
    }

    fn propagate(&self, potentials: &[Factor]) -> Vec<Factor> {
        let mut messages: HashMap<(usize, usize), Factor> = HashMap::new();

        // Collect towards the roots.
        for &clique in self.schedule.iter().rev() {
            if let Some(parent) = self.parent[clique] {
                let message = self.message(clique, parent, potentials, &messages);
                messages.insert((clique, parent), message);
            }
        }
        // Distribute back to the leaves.
        for &clique in &self.schedule {
            if let Some(parent) = self.parent[clique] {
                let message = self.message(parent, clique, potentials, &messages);
                messages.insert((parent, clique), message);
            }
        }

        potentials
            .iter()
            .enumerate()
            .map(|(clique, potential)| {
                self.neighbors[clique]
                    .iter()
                    .filter_map(|n| messages.get(&(*n, clique)))
                    .fold(potential.clone(), |belief, m| belief.product(m))
            })
            .collect()
    }

    fn message(
        &self,
        from: usize,
        to: usize,
        potentials: &[Factor],
        messages: &HashMap<(usize, usize), Factor>,
    ) -> Factor {
        let combined = self.neighbors[from]
            .iter()
            .filter(|n| **n != to)
            .filter_map(|n| messages.get(&(*n, from)))
            .fold(potentials[from].clone(), |acc, m| acc.product(m));
        let separator = self
            .separators
            .get(&edge_key(from, to))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let mut message = combined.marginalize(separator);
        message.normalize();
        message
    }
}

fn edge_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

fn is_subset(small: &[usize], large: &[usize]) -> bool {
    small.iter().all(|v| large.binary_search(v).is_ok())
}

/// Undirected moral graph: parent-child edges plus edges between co-parents.
fn moralize(network: &CausalNetwork) -> Vec<BTreeSet<usize>> {
    let mut adjacency = vec![BTreeSet::new(); network.len()];
    for node in 0..network.len() {
        let parents = network.parents(node);
        for (i, &p) in parents.iter().enumerate() {
            adjacency[node].insert(p);
            adjacency[p].insert(node);
            for &q in &parents[i + 1..] {
                adjacency[p].insert(q);
                adjacency[q].insert(p);
            }
        }
    }
    adjacency
}

/// Greedy min-fill elimination. Ties go to the lower degree, then the lower
/// index. Returns the elimination cliques in order.
fn triangulate(mut adjacency: Vec<BTreeSet<usize>>) -> Vec<Vec<usize>> {
    let n = adjacency.len();
    let mut eliminated = vec![false; n];
    let mut cliques = Vec::with_capacity(n);

    loop {
        let Some(v) = (0..n)
            .filter(|v| !eliminated[*v])
            .min_by_key(|&v| (fill_in(&adjacency, v), adjacency[v].len(), v))
        else {
            break;
        };
        let neighbors: Vec<usize> = adjacency[v].iter().copied().collect();
        for (i, &a) in neighbors.iter().enumerate() {
            for &b in &neighbors[i + 1..] {
                adjacency[a].insert(b);
                adjacency[b].insert(a);
            }
        }
        for &u in &neighbors {
            adjacency[u].remove(&v);
        }
        adjacency[v].clear();
        eliminated[v] = true;

        let mut clique = neighbors;
        clique.push(v);
        clique.sort_unstable();
        cliques.push(clique);
    }
    cliques
}

fn fill_in(adjacency: &[BTreeSet<usize>], v: usize) -> usize {
    let neighbors: Vec<usize> = adjacency[v].iter().copied().collect();
    let mut missing = 0;
    for (i, &a) in neighbors.iter().enumerate() {
        for b in &neighbors[i + 1..] {
            if !adjacency[a].contains(b) {
                missing += 1;
            }
        }
    }
    missing
}

fn maximal_cliques(candidates: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    let mut cliques: Vec<Vec<usize>> = Vec::new();
    for candidate in candidates {
        if cliques.iter().any(|c| is_subset(&candidate, c)) {
            continue;
        }
        cliques.retain(|c| !is_subset(c, &candidate));
        cliques.push(candidate);
    }
    cliques
}

type Forest = (Vec<Vec<usize>>, HashMap<(usize, usize), Vec<usize>>);

/// Kruskal over non-empty separators, heaviest first.
fn spanning_forest(cliques: &[Vec<usize>]) -> Forest {
    let k = cliques.len();
    let mut candidates = Vec::new();
    for i in 0..k {
        for j in i + 1..k {
            let separator: Vec<usize> = cliques[i]
                .iter()
                .copied()
                .filter(|v| cliques[j].binary_search(v).is_ok())
                .collect();
            if !separator.is_empty() {
                candidates.push((i, j, separator));
            }
        }
    }
    candidates.sort_by(|a, b| {
        b.2.len()
            .cmp(&a.2.len())
            .then(a.0.cmp(&b.0))
            .then(a.1.cmp(&b.1))
    });

    let mut sets = UnionFind::<usize>::new(k);
    let mut neighbors = vec![Vec::new(); k];
    let mut separators = HashMap::new();
    for (i, j, separator) in candidates {
        if sets.union(i, j) {
            neighbors[i].push(j);
            neighbors[j].push(i);
            separators.insert(edge_key(i, j), separator);
        }
    }
    (neighbors, separators)
}

/// Root every tree at its lowest clique and produce a breadth-first preorder.
fn root_trees(neighbors: &[Vec<usize>]) -> (Vec<Option<usize>>, Vec<usize>) {
    let k = neighbors.len();
    let mut parent = vec![None; k];
    let mut visited = vec![false; k];
    let mut schedule = Vec::with_capacity(k);

    for root in 0..k {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        let start = schedule.len();
        schedule.push(root);
        let mut cursor = start;
        while cursor < schedule.len() {
            let clique = schedule[cursor];
            cursor += 1;
            for &next in &neighbors[clique] {
                if !visited[next] {
                    visited[next] = true;
                    parent[next] = Some(clique);
                    schedule.push(next);
                }
            }
        }
    }
    (parent, schedule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_fill_prefers_simplicial_nodes() {
        // Square a-b-c-d-a: every node needs one fill edge, so the first
        // elimination (node 0) adds 1-3 and later ones are simplicial.
        let mut adjacency = vec![BTreeSet::new(); 4];
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0)] {
            adjacency[a].insert(b);
            adjacency[b].insert(a);
        }
        let cliques = maximal_cliques(triangulate(adjacency));
        assert_eq!(cliques, vec![vec![0, 1, 3], vec![1, 2, 3]]);
    }

    #[test]
    fn forest_keeps_disconnected_components_apart() {
        let cliques = vec![vec![0, 1], vec![1, 2], vec![3, 4]];
        let (neighbors, separators) = spanning_forest(&cliques);
        assert_eq!(neighbors[0], vec![1]);
        assert!(neighbors[2].is_empty());
        assert_eq!(separators[&(0, 1)], vec![1]);

        let (parent, schedule) = root_trees(&neighbors);
        assert_eq!(parent, vec![None, Some(0), None]);
        assert_eq!(schedule, vec![0, 1, 2]);
    }

    #[test]
    fn maximal_cliques_drop_subsets() {
        let cliques = maximal_cliques(vec![vec![0], vec![0, 1], vec![1], vec![1, 2]]);
        assert_eq!(cliques, vec![vec![0, 1], vec![1, 2]]);
    }
}
