//! Twin-side host: buffers observations, runs reasoning slices and expiry,
//! and feeds the reconciler.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use twin_core::{SimTime, SituationId, SituationType, TwinResult, VirtualOperation};
use twin_evolution::SituationReasoner;

use crate::message::OccurrenceMessage;
use crate::reconciler::{FidelityReport, Reconciler};

#[derive(Debug)]
pub struct Synchronizer {
    reasoner: SituationReasoner,
    reconciler: Reconciler,
    /// Pending triggering occurrences per observable situation.
    buffer: BTreeMap<SituationId, u32>,
    slice_cycle: SimTime,
    slice: u64,
}

impl Synchronizer {
    pub fn new(reasoner: SituationReasoner, slice_cycle: SimTime) -> Self {
        let operations = reasoner.state().graph().all_operational_situations();
        Self {
            reasoner,
            reconciler: Reconciler::new(operations),
            buffer: BTreeMap::new(),
            slice_cycle: slice_cycle.max(1),
            slice: 0,
        }
    }

    pub fn reasoner(&self) -> &SituationReasoner {
        &self.reasoner
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Index of the last slice run.
    pub fn slice(&self) -> u64 {
        self.slice
    }

    pub fn pending(&self, id: SituationId) -> u32 {
        self.buffer.get(&id).copied().unwrap_or(0)
    }

    /// Accept one ground-truth message from the channel.
    /// Rejected records are counted and logged by the reconciler and never
    /// reach the reasoner.
    pub fn receive(&mut self, message: &OccurrenceMessage) {
        if self.reconciler.ingest(message).is_err() {
            return;
        }
        if message.triggered && message.kind == SituationType::Normal {
            *self.buffer.entry(message.id).or_insert(0) += 1;
        }
    }

    /// Run one reasoning slice at `current`: drain one pending occurrence
    /// per situation, reason, and map the result to virtual operations.
    pub fn on_slice(&mut self, current: SimTime) -> TwinResult<Vec<VirtualOperation>> {
        self.slice = current / self.slice_cycle;

        let mut observed = BTreeSet::new();
        for (id, pending) in self.buffer.iter_mut() {
            if *pending > 0 {
                *pending -= 1;
                observed.insert(*id);
            }
        }

        let newly = self.reasoner.reason(&observed, current)?;
        let state = self.reasoner.state();
        for op in &newly {
            self.reconciler
                .record_twin(*op, state.counter(*op), state.cause_counts(*op));
        }

        let operations: Vec<VirtualOperation> = newly
            .iter()
            .map(|id| VirtualOperation {
                id: *id,
                timestamp: current,
                triggered: true,
            })
            .collect();
        info!(
            current,
            slice = self.slice,
            observed = observed.len(),
            operations = operations.len(),
            "slice synchronized"
        );
        Ok(operations)
    }

    /// Periodic lifecycle expiry.
    pub fn on_check(&mut self, current: SimTime) -> usize {
        let expired = self.reasoner.check_state(current);
        if expired > 0 {
            debug!(current, expired, "lifecycle check");
        }
        expired
    }

    pub fn report(&self, actual_consistent: usize) -> FidelityReport {
        self.reconciler
            .report(self.reasoner.state(), actual_consistent, Some(self.slice))
    }
}
