//! Property tests: reconciliation ignores arrival order across situations.

use proptest::prelude::*;

use twin_core::{OccurrenceRecord, PhysicalOperation, SituationType};
use twin_sync::{OccurrenceMessage, Reconciler};

const OPERATIONS: [i64; 3] = [11, 12, 13];

fn message(id: i64, occurrence: u32) -> OccurrenceMessage {
    let record = OccurrenceRecord {
        operation: PhysicalOperation {
            id,
            timestamp: 0,
            triggered: true,
            kind: SituationType::Normal,
            counter: occurrence,
        },
        cause_counts: [(11, occurrence)].into_iter().collect(),
    };
    OccurrenceMessage::from_record(&record).unwrap()
}

/// Per-situation streams, numbered in order.
fn streams(counts: &[u32]) -> Vec<Vec<OccurrenceMessage>> {
    OPERATIONS
        .iter()
        .zip(counts)
        .map(|(id, n)| (1..=*n).map(|k| message(*id, k)).collect())
        .collect()
}

fn reconcile(order: impl IntoIterator<Item = OccurrenceMessage>) -> Reconciler {
    let mut reconciler = Reconciler::new(OPERATIONS.to_vec());
    for msg in order {
        reconciler.ingest(&msg).unwrap();
    }
    for (id, k) in [(12, 1), (13, 2), (13, 4)] {
        reconciler.record_twin(id, k, [(11, 1)].into_iter().collect());
    }
    reconciler
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn interleaving_does_not_change_fidelity(
        counts in prop::collection::vec(0u32..6, 3),
        picks in prop::collection::vec(0usize..3, 0..40),
    ) {
        let sequential = reconcile(streams(&counts).into_iter().flatten());

        // Merge the streams in an arbitrary order, keeping each one in order.
        let mut queues: Vec<std::collections::VecDeque<_>> =
            streams(&counts).into_iter().map(Into::into).collect();
        let mut merged = Vec::new();
        for pick in picks {
            if let Some(msg) = queues[pick].pop_front() {
                merged.push(msg);
            }
        }
        merged.extend(queues.into_iter().flatten());
        let interleaved = reconcile(merged);

        prop_assert_eq!(sequential.actual_counters(), interleaved.actual_counters());
        prop_assert_eq!(sequential.alignment_fidelity(), interleaved.alignment_fidelity());
        let twin = [(11, 1), (12, 2)].into_iter().collect();
        prop_assert_eq!(
            sequential.occurrence_fidelity(&twin, None),
            interleaved.occurrence_fidelity(&twin, None)
        );
    }
}
