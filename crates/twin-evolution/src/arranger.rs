//! Ground-truth generator.
//!
//! Top situations gate when a burst of related occurrences may start; each
//! operational situation then emits on its own sampling cadence.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use twin_core::config::defaults::DEFAULT_INFERENCE_THRESHOLD;
use twin_core::config::ArrangerConfig;
use twin_core::{
    OccurrenceRecord, PhysicalOperation, SimTime, SituationId, SituationState, TwinResult,
};
use twin_graph::{SituationGraph, SituationNode};

use crate::evolution::{Evolution, SituationEvolution};
use crate::gate::{gate_from_config, TriggerGate};

pub struct SituationArranger {
    state: SituationEvolution,
    gate: Box<dyn TriggerGate>,
    /// Operational situations armed by a running top situation.
    active: BTreeSet<SituationId>,
    max_trigger_limit: u32,
}

impl SituationArranger {
    pub fn new(graph: Arc<SituationGraph>, config: &ArrangerConfig) -> Self {
        let mut arranger = Self::with_gate(graph, gate_from_config(config));
        arranger.max_trigger_limit = config.max_trigger_limit;
        arranger
    }

    pub fn with_gate(graph: Arc<SituationGraph>, gate: Box<dyn TriggerGate>) -> Self {
        Self {
            state: SituationEvolution::new(graph, DEFAULT_INFERENCE_THRESHOLD),
            gate,
            active: BTreeSet::new(),
            max_trigger_limit: ArrangerConfig::default().max_trigger_limit,
        }
    }

    pub fn state(&self) -> &SituationEvolution {
        &self.state
    }

    pub fn active(&self) -> &BTreeSet<SituationId> {
        &self.active
    }

    /// Carried from configuration; generation does not consult it.
    pub fn max_trigger_limit(&self) -> u32 {
        self.max_trigger_limit
    }

    /// Advance one generation tick and return the observable operations.
    pub fn arrange(&mut self, current: SimTime) -> Vec<PhysicalOperation> {
        let graph = Arc::clone(self.state.graph());

        let triggerable: Vec<&SituationNode> = graph
            .top_layer()
            .order
            .iter()
            .filter_map(|id| graph.node(*id))
            .filter(|node| self.is_triggerable(node))
            .collect();

        for node in triggerable {
            self.transition(&graph, node.id, current);
        }

        let operations = self.emit(&graph, current);
        info!(
            current,
            operations = operations.len(),
            triggering = operations.iter().filter(|op| op.triggered).count(),
            active = self.active.len(),
            "arranger tick"
        );
        operations
    }

    /// [`arrange`](Self::arrange) plus the cause-count map of every record,
    /// taken after the emission pass.
    pub fn occurrences(&mut self, current: SimTime) -> Vec<OccurrenceRecord> {
        self.arrange(current)
            .into_iter()
            .map(|operation| OccurrenceRecord {
                cause_counts: self.state.cause_counts(operation.id),
                operation,
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.active.clear();
    }

    /// Causal-order guard: every cause is strictly ahead of the node.
    fn is_triggerable(&self, node: &SituationNode) -> bool {
        let own = self.state.counter(node.id);
        node.causes.iter().all(|cause| self.state.counter(*cause) > own)
    }

    fn transition(&mut self, graph: &SituationGraph, id: SituationId, current: SimTime) {
        let Some(top) = self.state.instance(id).cloned() else {
            return;
        };
        let descendants = graph.operational_situations(id);

        if top.state == SituationState::Untriggered {
            if top.next_start > current || !self.gate.pass(id) {
                return;
            }
            self.set_state(id, SituationState::Triggered);
            for op in &descendants {
                self.set_state(*op, SituationState::Triggered);
                self.active.insert(*op);
            }
            debug!(id, current, descendants = descendants.len(), "top situation triggered");
            return;
        }

        let progressed = descendants.iter().all(|op| {
            self.state
                .instance(*op)
                .is_some_and(|i| i.state != SituationState::Triggered && i.counter > top.counter)
        });

        if progressed && top.lifecycle_elapsed(current) {
            if let Some(instance) = self.state.instance_mut(id) {
                instance.state = SituationState::Untriggered;
                instance.counter += 1;
                instance.next_start = current + instance.cycle_or_zero();
                debug!(id, current, counter = instance.counter, next_start = instance.next_start, "top situation reset");
            }
            for op in &descendants {
                self.active.remove(op);
            }
        } else {
            for op in &descendants {
                let Some(instance) = self.state.instance_mut(*op) else {
                    continue;
                };
                if instance.state == SituationState::Untriggered && instance.counter <= top.counter {
                    instance.state = SituationState::Triggered;
                    self.active.insert(*op);
                }
            }
        }
    }

    fn emit(&mut self, graph: &SituationGraph, current: SimTime) -> Vec<PhysicalOperation> {
        let mut operations = Vec::new();
        for id in &graph.bottom_layer().order {
            let armed = self.active.contains(id);
            let Some(instance) = self.state.instance_mut(*id) else {
                continue;
            };
            if !instance.aligned(current) {
                instance.state = SituationState::Untriggered;
                continue;
            }

            let triggered = armed && instance.state == SituationState::Triggered;
            if triggered {
                instance.counter += 1;
                instance.state = SituationState::Untriggered;
                debug!(id, current, counter = instance.counter, "operational situation emitted");
            }
            if instance.kind.is_observable() {
                operations.push(PhysicalOperation {
                    id: *id,
                    timestamp: current,
                    triggered,
                    kind: instance.kind,
                    counter: instance.counter,
                });
            }
        }
        operations
    }

    fn set_state(&mut self, id: SituationId, state: SituationState) {
        if let Some(instance) = self.state.instance_mut(id) {
            instance.state = state;
        }
    }
}

impl Evolution for SituationArranger {
    type Input = ();
    type Output = Vec<OccurrenceRecord>;

    fn step(&mut self, _input: (), current: SimTime) -> TwinResult<Self::Output> {
        Ok(self.occurrences(current))
    }

    fn evolution(&self) -> &SituationEvolution {
        &self.state
    }
}

impl std::fmt::Debug for SituationArranger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SituationArranger")
            .field("state", &self.state)
            .field("active", &self.active)
            .field("max_trigger_limit", &self.max_trigger_limit)
            .finish_non_exhaustive()
    }
}
