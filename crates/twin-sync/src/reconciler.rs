//! Fidelity between the ground-truth stream and the twin.
//!
//! Entries are keyed by `(id, occurrence index)` only, so arrival order and
//! latency never matter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use twin_core::errors::RecordError;
use twin_core::{CauseCounts, OccurrenceRecord, SituationId};
use twin_evolution::SituationEvolution;

use crate::message::OccurrenceMessage;

/// End-of-run fidelity scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FidelityReport {
    /// 1.0 is a perfect occurrence match; unbounded below.
    pub occurrence_fidelity: f64,
    /// 0.0 is perfect causal alignment.
    pub alignment_fidelity: f64,
    pub actual_consistent: usize,
    pub twin_consistent: usize,
    pub rejected_records: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    operations: Vec<SituationId>,
    actual_counters: BTreeMap<SituationId, u32>,
    actual_causes: BTreeMap<(SituationId, u32), CauseCounts>,
    twin_causes: BTreeMap<(SituationId, u32), CauseCounts>,
    rejected: usize,
}

impl Reconciler {
    /// Reconcile over the given operational situations.
    pub fn new(operations: Vec<SituationId>) -> Self {
        Self {
            operations,
            ..Self::default()
        }
    }

    /// Ingest one ground-truth message. Heartbeats are ignored; an unknown
    /// situation or a malformed cause-count payload rejects the message and
    /// is counted.
    pub fn ingest(&mut self, message: &OccurrenceMessage) -> Result<(), RecordError> {
        if !message.triggered {
            return Ok(());
        }
        let decoded = self
            .check_known(message.id)
            .and_then(|()| message.cause_counts());
        match decoded {
            Ok(causes) => {
                self.record_actual(message.id, causes);
                Ok(())
            }
            Err(e) => {
                self.rejected += 1;
                warn!(id = message.id, timestamp = message.timestamp, error = %e, "occurrence rejected");
                Err(e)
            }
        }
    }

    /// Ingest an already decoded ground-truth record.
    pub fn ingest_record(&mut self, record: &OccurrenceRecord) -> Result<(), RecordError> {
        if !record.triggered() {
            return Ok(());
        }
        if let Err(e) = self.check_known(record.id()) {
            self.rejected += 1;
            warn!(id = record.id(), error = %e, "occurrence rejected");
            return Err(e);
        }
        self.record_actual(record.id(), record.cause_counts.clone());
        Ok(())
    }

    fn check_known(&self, id: SituationId) -> Result<(), RecordError> {
        if self.operations.contains(&id) {
            Ok(())
        } else {
            Err(RecordError::UnknownSituation(id))
        }
    }

    fn record_actual(&mut self, id: SituationId, causes: CauseCounts) {
        let counter = self.actual_counters.entry(id).or_insert(0);
        *counter += 1;
        debug!(id, occurrence = *counter, "actual occurrence recorded");
        self.actual_causes.insert((id, *counter), causes);
    }

    /// Record a twin-side newly operational situation at its twin counter.
    pub fn record_twin(&mut self, id: SituationId, counter: u32, causes: CauseCounts) {
        self.twin_causes.insert((id, counter), causes);
    }

    pub fn actual_counter(&self, id: SituationId) -> u32 {
        self.actual_counters.get(&id).copied().unwrap_or(0)
    }

    pub fn actual_counters(&self) -> &BTreeMap<SituationId, u32> {
        &self.actual_counters
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn twin_entries(&self) -> usize {
        self.twin_causes.len()
    }

    /// `1 - sqrt(mean((twin - min(actual, slice))^2))` over the operational
    /// situations. The cap only applies when `slice` is given.
    pub fn occurrence_fidelity(
        &self,
        twin_counters: &BTreeMap<SituationId, u32>,
        slice: Option<u64>,
    ) -> f64 {
        if self.operations.is_empty() {
            return 1.0;
        }
        let sum: f64 = self
            .operations
            .iter()
            .map(|op| {
                let twin = f64::from(twin_counters.get(op).copied().unwrap_or(0));
                let mut actual = u64::from(self.actual_counter(*op));
                if let Some(slice) = slice {
                    actual = actual.min(slice);
                }
                (twin - actual as f64).powi(2)
            })
            .sum();
        1.0 - (sum / self.operations.len() as f64).sqrt()
    }

    /// Root mean square over twin entries of the largest cause-count gap.
    /// Missing actual counts are 0; entries without causes contribute 0.
    pub fn alignment_fidelity(&self) -> f64 {
        if self.twin_causes.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .twin_causes
            .iter()
            .map(|(key, causes)| {
                let actual = self.actual_causes.get(key);
                let max_diff = causes
                    .iter()
                    .map(|(cause, twin)| {
                        let act = actual.and_then(|a| a.get(cause)).copied().unwrap_or(0);
                        twin.abs_diff(act)
                    })
                    .max()
                    .unwrap_or(0);
                f64::from(max_diff).powi(2)
            })
            .sum();
        (sum / self.twin_causes.len() as f64).sqrt()
    }

    pub fn report(
        &self,
        twin: &SituationEvolution,
        actual_consistent: usize,
        slice: Option<u64>,
    ) -> FidelityReport {
        FidelityReport {
            occurrence_fidelity: self.occurrence_fidelity(&twin.counters(), slice),
            alignment_fidelity: self.alignment_fidelity(),
            actual_consistent,
            twin_consistent: twin.consistent_count(),
            rejected_records: self.rejected,
        }
    }
}
