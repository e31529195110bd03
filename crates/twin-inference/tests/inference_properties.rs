//! Property tests: junction-tree posteriors equal brute-force enumeration.

use std::sync::Arc;

use petgraph::unionfind::UnionFind;
use proptest::prelude::*;

use twin_graph::{SituationGraphBuilder, SituationSpec};
use twin_inference::{CausalNetwork, InferenceEngine};

/// Joint probability of `assignment` restricted to the factors of `nodes`.
fn joint(network: &CausalNetwork, nodes: &[usize], assignment: usize) -> f64 {
    nodes
        .iter()
        .map(|&v| {
            let parents = network
                .parents(v)
                .iter()
                .enumerate()
                .fold(0, |acc, (bit, &p)| acc | ((assignment >> p & 1) << bit));
            network.probability(v, assignment >> v & 1 == 1, parents)
        })
        .product()
}

/// `P(v = 1 | evidence)` by enumeration over `v`'s connected component,
/// falling back to the prior when the evidence is impossible there.
fn brute_force(network: &CausalNetwork, evidence: &[Option<bool>], v: usize) -> f64 {
    let n = network.len();
    let mut sets = UnionFind::<usize>::new(n);
    for node in 0..n {
        for &p in network.parents(node) {
            sets.union(node, p);
        }
    }
    let component: Vec<usize> = (0..n).filter(|u| sets.equiv(*u, v)).collect();

    let enumerate = |use_evidence: bool| {
        let (mut on, mut total) = (0.0, 0.0);
        for assignment in 0..1_usize << n {
            let consistent = !use_evidence
                || component.iter().all(|&u| {
                    evidence[u].map_or(true, |e| (assignment >> u & 1 == 1) == e)
                });
            if !consistent {
                continue;
            }
            let p = joint(network, &component, assignment);
            total += p;
            if assignment >> v & 1 == 1 {
                on += p;
            }
        }
        (on, total)
    };

    let (on, total) = enumerate(true);
    if total > 0.0 {
        on / total
    } else {
        let (on, total) = enumerate(false);
        on / total
    }
}

fn network_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize, f64)>, Vec<Option<bool>>)> {
    (1_usize..=7).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n, 0.05_f64..0.95), 0..n * 2),
            prop::collection::vec(prop::option::of(any::<bool>()), n),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn posteriors_match_enumeration((n, edges, evidence) in network_strategy()) {
        let mut specs: Vec<SituationSpec> = (0..n).map(|i| SituationSpec::new(i as i64)).collect();
        for &(a, b, weight) in &edges {
            if a < b {
                specs[b] = specs[b].clone().cause(a as i64, weight);
            }
        }
        let graph = Arc::new(SituationGraphBuilder::new().layer(specs).build().unwrap());
        let engine = InferenceEngine::new(Arc::clone(&graph), 20).unwrap();
        let posteriors = engine.infer(&evidence).unwrap();

        let network = engine.network();
        let local_evidence: Vec<Option<bool>> =
            (0..n).map(|local| evidence[network.ordinal(local)]).collect();

        for ordinal in 0..n {
            match evidence[ordinal] {
                Some(_) => prop_assert_eq!(posteriors.at(ordinal), None),
                None => {
                    let local = network.local_of_ordinal(ordinal);
                    let expected = brute_force(network, &local_evidence, local);
                    let got = posteriors.at(ordinal).unwrap();
                    prop_assert!((got - expected).abs() < 1e-9, "node {}: {} vs {}", ordinal, got, expected);
                    prop_assert!((0.0..=1.0 + 1e-12).contains(&got));
                }
            }
        }
    }
}
