//! Tests for twin-inference: CPT construction, posteriors, degenerate cases.

use std::sync::Arc;

use twin_core::errors::InferenceError;
use twin_graph::{load_model, SituationGraph, SituationGraphBuilder, SituationSpec};
use twin_inference::{CausalNetwork, InferenceEngine};

const EPS: f64 = 1e-9;

fn two_cause_graph() -> SituationGraph {
    SituationGraphBuilder::new()
        .layer(vec![
            SituationSpec::new(1),
            SituationSpec::new(2),
            SituationSpec::new(3).cause(1, 0.3).cause(2, 0.6),
        ])
        .build()
        .unwrap()
}

fn chain_engine() -> (Arc<SituationGraph>, InferenceEngine) {
    let graph = Arc::new(
        load_model(test_fixtures::fixture_path(test_fixtures::CHAIN_THREE_LAYER)).unwrap(),
    );
    let engine = InferenceEngine::new(Arc::clone(&graph), 20).unwrap();
    (graph, engine)
}

fn evidence(graph: &SituationGraph, known: &[(i64, bool)]) -> Vec<Option<bool>> {
    let mut values = vec![None; graph.len()];
    for (id, value) in known {
        values[graph.ordinal(*id).unwrap()] = Some(*value);
    }
    values
}

// =============================================================================
// CPT construction
// =============================================================================

#[test]
fn cpt_multiplies_weights_of_active_causes() {
    let network = CausalNetwork::from_graph(&two_cause_graph()).unwrap();
    let both = network.conditional(3, true, &[1, 2]).unwrap();
    let first = network.conditional(3, true, &[1]).unwrap();
    let second = network.conditional(3, true, &[2]).unwrap();
    assert!((both - 0.18).abs() < EPS);
    assert!((first - 0.3).abs() < EPS);
    assert!((second - 0.6).abs() < EPS);
    assert!((network.conditional(3, false, &[1, 2]).unwrap() - 0.82).abs() < EPS);
}

#[test]
fn cpt_with_no_active_cause_is_certain() {
    // The empty product is 1: an effect with causes but none of them on is
    // always triggered. Degenerate, kept deliberately.
    let network = CausalNetwork::from_graph(&two_cause_graph()).unwrap();
    assert_eq!(network.conditional(3, true, &[]).unwrap(), 1.0);
    assert_eq!(network.conditional(3, false, &[]).unwrap(), 0.0);
}

#[test]
fn root_situations_get_uniform_prior() {
    let network = CausalNetwork::from_graph(&two_cause_graph()).unwrap();
    assert_eq!(network.conditional(1, true, &[]).unwrap(), 0.5);
    assert_eq!(network.conditional(2, false, &[]).unwrap(), 0.5);
}

#[test]
fn conditional_rejects_unknown_ids() {
    let network = CausalNetwork::from_graph(&two_cause_graph()).unwrap();
    assert!(matches!(
        network.conditional(99, true, &[]),
        Err(InferenceError::UnknownSituation(99))
    ));
    // 3 is not a cause of 1.
    assert!(matches!(
        network.conditional(1, true, &[3]),
        Err(InferenceError::UnknownSituation(3))
    ));
}

#[test]
fn network_uses_causal_relations_only() {
    let (graph, engine) = chain_engine();
    let network = engine.network();
    assert_eq!(network.len(), graph.len());
    assert_eq!(network.edge_count(), 2);
    let local = network.local_index(21).unwrap();
    assert!(network.parents(local).is_empty());
    // Parents precede children in local order.
    for node in 0..network.len() {
        assert!(network.parents(node).iter().all(|p| *p < node));
    }
}

// =============================================================================
// Posteriors
// =============================================================================

#[test]
fn prior_follows_the_chain() {
    let (_, engine) = chain_engine();
    assert!((engine.prior(1).unwrap() - 0.5).abs() < EPS);
    // 0.5 * 0.9 + 0.5 * 1.0
    assert!((engine.prior(2).unwrap() - 0.95).abs() < EPS);
    // 0.95 * 0.7 + 0.05 * 1.0
    assert!((engine.prior(3).unwrap() - 0.715).abs() < EPS);
    assert_eq!(engine.prior(999), None);
}

#[test]
fn evidence_on_effect_updates_cause() {
    let (graph, engine) = chain_engine();
    let posteriors = engine.infer(&evidence(&graph, &[(2, true)])).unwrap();
    // P(1 | 2) = 0.45 / (0.45 + 0.5)
    let expected = 0.45 / 0.95;
    assert!((posteriors.get(1).unwrap() - expected).abs() < EPS);
    assert!((posteriors.get(3).unwrap() - 0.7).abs() < EPS);
    // Observed nodes are not queried.
    assert_eq!(posteriors.get(2), None);
}

#[test]
fn isolated_situations_keep_their_prior() {
    let (graph, engine) = chain_engine();
    let posteriors = engine.infer(&evidence(&graph, &[(1, true), (31, true)])).unwrap();
    assert!((posteriors.get(4).unwrap() - 0.5).abs() < EPS);
    assert!((posteriors.get(32).unwrap() - 0.5).abs() < EPS);
    assert_eq!(posteriors.get(31), None);
}

#[test]
fn impossible_evidence_falls_back_to_prior() {
    let (graph, engine) = chain_engine();
    // 1 off forces 2 on, so observing both off has zero probability.
    let posteriors = engine
        .infer(&evidence(&graph, &[(1, false), (2, false)]))
        .unwrap();
    assert!((posteriors.get(3).unwrap() - 0.715).abs() < EPS);
    // Other components are unaffected.
    assert!((posteriors.get(4).unwrap() - 0.5).abs() < EPS);
}

#[test]
fn posteriors_iterate_in_ordinal_order() {
    let (graph, engine) = chain_engine();
    let posteriors = engine.infer(&evidence(&graph, &[(2, true)])).unwrap();
    let ids: Vec<i64> = posteriors.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![1, 3, 4, 21, 31, 32]);
    assert_eq!(posteriors.len(), 6);
}

#[test]
fn repeated_queries_are_identical() {
    let (graph, engine) = chain_engine();
    let e = evidence(&graph, &[(3, true)]);
    let first: Vec<_> = engine.infer(&e).unwrap().iter().collect();
    let _ = engine.infer(&evidence(&graph, &[(1, false)])).unwrap();
    let second: Vec<_> = engine.infer(&e).unwrap().iter().collect();
    assert_eq!(first, second);
}

// =============================================================================
// Structure and errors
// =============================================================================

#[test]
fn forest_has_one_tree_per_component() {
    let (_, engine) = chain_engine();
    // {1,2,3} plus the isolated 4, 21, 31, 32.
    assert_eq!(engine.junction_tree().tree_count(), 5);
    assert_eq!(engine.junction_tree().largest_clique(), 2);
}

#[test]
fn evidence_length_must_match() {
    let (_, engine) = chain_engine();
    assert!(matches!(
        engine.infer(&[None, Some(true)]),
        Err(InferenceError::EvidenceShape { expected: 7, got: 2 })
    ));
}

#[test]
fn wide_families_exceed_clique_limit() {
    let graph = Arc::new(
        SituationGraphBuilder::new()
            .layer(vec![
                SituationSpec::new(1),
                SituationSpec::new(2),
                SituationSpec::new(3),
                SituationSpec::new(4).cause(1, 0.5).cause(2, 0.5).cause(3, 0.5),
            ])
            .build()
            .unwrap(),
    );
    assert!(matches!(
        InferenceEngine::new(Arc::clone(&graph), 3),
        Err(InferenceError::CliqueTooLarge { size: 4, max: 3 })
    ));
    assert!(InferenceEngine::new(graph, 4).is_ok());
}
