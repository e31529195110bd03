//! State shared by both engines and the trait they implement.

use std::collections::BTreeMap;
use std::sync::Arc;

use twin_core::{CauseCounts, SimTime, SituationId, SituationInstance, SituationState, TwinResult};
use twin_graph::SituationGraph;

use crate::arena::InstanceArena;

/// The graph plus one engine's instances.
#[derive(Debug, Clone)]
pub struct SituationEvolution {
    graph: Arc<SituationGraph>,
    arena: InstanceArena,
}

impl SituationEvolution {
    pub fn new(graph: Arc<SituationGraph>, default_threshold: f64) -> Self {
        let arena = InstanceArena::from_graph(&graph, default_threshold);
        Self { graph, arena }
    }

    pub fn graph(&self) -> &Arc<SituationGraph> {
        &self.graph
    }

    pub fn arena(&self) -> &InstanceArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut InstanceArena {
        &mut self.arena
    }

    pub fn instance(&self, id: SituationId) -> Option<&SituationInstance> {
        self.graph.ordinal(id).and_then(|o| self.arena.get(o))
    }

    pub fn instance_mut(&mut self, id: SituationId) -> Option<&mut SituationInstance> {
        self.graph.ordinal(id).and_then(|o| self.arena.get_mut(o))
    }

    /// Trigger counter of `id`, 0 for unknown ids.
    pub fn counter(&self, id: SituationId) -> u32 {
        self.instance(id).map_or(0, |i| i.counter)
    }

    pub fn state(&self, id: SituationId) -> Option<SituationState> {
        self.instance(id).map(|i| i.state)
    }

    /// Every counter keyed by id.
    pub fn counters(&self) -> BTreeMap<SituationId, u32> {
        self.arena.iter().map(|i| (i.id, i.counter)).collect()
    }

    /// Hard evidence per ordinal; `None` for undetermined instances.
    pub fn evidence(&self) -> Vec<Option<bool>> {
        self.arena.iter().map(|i| i.state.evidence()).collect()
    }

    /// No operational strict cause of `op` lags behind it.
    pub fn is_consistent(&self, op: SituationId) -> bool {
        let own = self.counter(op);
        self.graph
            .strict_causes_of(op)
            .iter()
            .all(|cause| self.counter(*cause) >= own)
    }

    /// Number of consistent operational situations.
    pub fn consistent_count(&self) -> usize {
        self.graph
            .all_operational_situations()
            .into_iter()
            .filter(|op| self.is_consistent(*op))
            .count()
    }

    /// Current counter of every operational strict cause of `op`.
    pub fn cause_counts(&self, op: SituationId) -> CauseCounts {
        self.graph
            .strict_causes_of(op)
            .iter()
            .map(|cause| (*cause, self.counter(*cause)))
            .collect()
    }

    pub fn reset(&mut self) {
        self.arena.reset();
    }
}

/// One evolution strategy over a [`SituationEvolution`].
///
/// The arranger steps once per generation tick, the reasoner once per slice.
pub trait Evolution {
    type Input;
    type Output;

    /// Advance the engine at `current`.
    fn step(&mut self, input: Self::Input, current: SimTime) -> TwinResult<Self::Output>;

    fn evolution(&self) -> &SituationEvolution;

    fn consistent_count(&self) -> usize {
        self.evolution().consistent_count()
    }

    fn counter(&self, id: SituationId) -> u32 {
        self.evolution().counter(id)
    }

    fn cause_counts(&self, op: SituationId) -> CauseCounts {
        self.evolution().cause_counts(op)
    }
}
