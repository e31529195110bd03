//! Tests for the twin-side reasoner.

use std::collections::BTreeSet;
use std::sync::Arc;

use twin_core::config::ReasonerConfig;
use twin_core::SituationState;
use twin_evolution::{Evolution, SituationReasoner};
use twin_graph::{load_model, SituationGraph};

fn fixture(name: &str) -> Arc<SituationGraph> {
    Arc::new(load_model(test_fixtures::fixture_path(name)).unwrap())
}

fn reasoner(name: &str) -> SituationReasoner {
    SituationReasoner::new(fixture(name), &ReasonerConfig::default()).unwrap()
}

fn ids(values: &[i64]) -> BTreeSet<i64> {
    values.iter().copied().collect()
}

// =============================================================================
// Observation and propagation
// =============================================================================

#[test]
fn observations_trigger_operational_situations() {
    let mut reasoner = reasoner(test_fixtures::TWO_LAYER);
    let newly = reasoner.reason(&ids(&[11, 13]), 0).unwrap();
    assert_eq!(newly, ids(&[11, 13]));
    assert_eq!(reasoner.counter(11), 1);
    assert_eq!(reasoner.counter(12), 0);
    let instance = reasoner.state().instance(11).unwrap();
    assert_eq!(instance.state, SituationState::Triggered);
    assert_eq!(instance.next_start, 0);
}

#[test]
fn parent_needs_every_evidence_ahead() {
    let mut reasoner = reasoner(test_fixtures::TWO_LAYER);
    reasoner.reason(&ids(&[11, 12]), 0).unwrap();
    assert_eq!(reasoner.counter(1), 0);

    reasoner.reason(&ids(&[13]), 1).unwrap();
    assert_eq!(reasoner.counter(1), 1);
    assert_eq!(reasoner.state().state(1), Some(SituationState::Triggered));
}

#[test]
fn propagation_climbs_every_layer() {
    let mut reasoner = reasoner(test_fixtures::SMART_HOME);
    reasoner.reason(&ids(&[300, 301]), 0).unwrap();
    assert_eq!(reasoner.counter(200), 1);
    assert_eq!(reasoner.counter(100), 1);
    assert_eq!(reasoner.counter(201), 0);
}

#[test]
fn upper_situation_without_evidences_triggers_every_slice() {
    let mut reasoner = reasoner(test_fixtures::CHAIN_THREE_LAYER);
    for current in [0, 1_000, 2_000] {
        assert!(reasoner.reason(&BTreeSet::new(), current).unwrap().is_empty());
    }
    for id in [1, 2, 3] {
        assert_eq!(reasoner.counter(id), 3, "situation {id}");
    }
    // 4 still waits on its evidence.
    assert_eq!(reasoner.counter(4), 0);
    assert_eq!(reasoner.counter(21), 0);
    let instance = reasoner.state().instance(3).unwrap();
    assert_eq!(instance.next_start, 2_000);
}

#[test]
fn non_operational_and_unknown_observations_are_ignored() {
    let mut reasoner = reasoner(test_fixtures::SMART_HOME);
    let newly = reasoner.reason(&ids(&[100, 200, 9_999]), 0).unwrap();
    assert!(newly.is_empty());
    assert!(reasoner.state().counters().values().all(|c| *c == 0));
}

#[test]
fn only_situations_triggered_this_slice_are_returned() {
    let mut reasoner = reasoner(test_fixtures::SMART_HOME);
    assert_eq!(reasoner.reason(&ids(&[300]), 0).unwrap(), ids(&[300]));
    // 300 is still triggered (duration 1000) but was not started at 500.
    assert_eq!(reasoner.reason(&ids(&[302]), 500).unwrap(), ids(&[302]));
}

// =============================================================================
// Refinement
// =============================================================================

#[test]
fn lagging_cause_is_refined_against_threshold() {
    // 13 observed: 2 propagates, its cause 1 lags and becomes undetermined.
    // P(1 | 2) = 0.4 / 0.9 falls below the default threshold.
    let mut reasoner = reasoner(test_fixtures::CAUSAL_PIPELINE);
    reasoner.reason(&ids(&[13]), 0).unwrap();
    assert_eq!(reasoner.counter(2), 1);
    assert_eq!(reasoner.counter(1), 0);
    assert_eq!(reasoner.state().state(1), Some(SituationState::Untriggered));
}

#[test]
fn lagging_cause_is_committed_above_threshold() {
    let config = ReasonerConfig {
        default_threshold: 0.4,
        ..ReasonerConfig::default()
    };
    let mut reasoner =
        SituationReasoner::new(fixture(test_fixtures::CAUSAL_PIPELINE), &config).unwrap();
    let newly = reasoner.reason(&ids(&[13]), 0).unwrap();
    assert_eq!(reasoner.counter(1), 1);
    let cause = reasoner.state().instance(1).unwrap();
    assert_eq!(cause.state, SituationState::Triggering);
    assert_eq!(cause.next_start, 0);
    // Inferred situations are never reported as operational.
    assert_eq!(newly, ids(&[13]));
}

#[test]
fn model_threshold_overrides_configuration() {
    let reasoner = reasoner(test_fixtures::CAUSAL_PIPELINE);
    assert_eq!(reasoner.state().instance(2).unwrap().threshold, 0.4);
    assert_eq!(reasoner.state().instance(1).unwrap().threshold, 0.5);
}

// =============================================================================
// Expiry
// =============================================================================

#[test]
fn check_state_expires_elapsed_lifecycles() {
    let mut reasoner = reasoner(test_fixtures::SMART_HOME);
    reasoner.reason(&ids(&[300, 301]), 0).unwrap();
    assert_eq!(reasoner.check_state(500), 0);
    // 300 and 301 (duration 1000) expire, 200 and 100 (3000) stay.
    assert_eq!(reasoner.check_state(1_000), 2);
    assert_eq!(reasoner.state().state(300), Some(SituationState::Untriggered));
    assert_eq!(reasoner.state().state(200), Some(SituationState::Triggered));
    assert_eq!(reasoner.check_state(3_000), 2);
    // Counters survive expiry.
    assert_eq!(reasoner.counter(300), 1);
}

#[test]
fn slice_ends_with_expiry() {
    let mut reasoner = reasoner(test_fixtures::TWO_LAYER);
    reasoner.reason(&ids(&[11, 12, 13]), 0).unwrap();
    reasoner.reason(&BTreeSet::new(), 1).unwrap();
    assert_eq!(reasoner.state().state(11), Some(SituationState::Untriggered));
    assert_eq!(reasoner.state().state(1), Some(SituationState::Untriggered));
}

#[test]
fn consistency_metric_counts_lagging_effects() {
    let mut reasoner = reasoner(test_fixtures::CAUSAL_PIPELINE);
    assert_eq!(reasoner.consistent_count(), 3);
    // 13 observed without its strict causes 11 and 12.
    reasoner.reason(&ids(&[13]), 0).unwrap();
    assert_eq!(reasoner.consistent_count(), 2);
    let causes = reasoner.cause_counts(13);
    assert_eq!(causes.into_iter().collect::<Vec<_>>(), vec![(11, 0), (12, 0)]);

    reasoner.reason(&ids(&[11, 12]), 500).unwrap();
    assert_eq!(reasoner.consistent_count(), 3);
}
