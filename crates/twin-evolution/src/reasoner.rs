//! Twin-side reconstruction of the situation hierarchy.
//!
//! Each slice runs four ordered stages: observation, bottom-up propagation,
//! undetermined marking, probabilistic refinement. Lifecycle expiry closes
//! the slice and can also run on its own schedule.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use twin_core::config::ReasonerConfig;
use twin_core::{SimTime, SituationId, SituationState, TwinResult};
use twin_graph::SituationGraph;
use twin_inference::InferenceEngine;

use crate::evolution::{Evolution, SituationEvolution};

#[derive(Debug, Clone)]
pub struct SituationReasoner {
    state: SituationEvolution,
    engine: InferenceEngine,
}

impl SituationReasoner {
    pub fn new(graph: Arc<SituationGraph>, config: &ReasonerConfig) -> TwinResult<Self> {
        let engine = InferenceEngine::new(Arc::clone(&graph), config.max_clique_size)?;
        Ok(Self {
            state: SituationEvolution::new(graph, config.default_threshold),
            engine,
        })
    }

    pub fn state(&self) -> &SituationEvolution {
        &self.state
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    /// Run one reasoning slice. Returns the operational situations that
    /// became triggered at `current`.
    pub fn reason(
        &mut self,
        observed: &BTreeSet<SituationId>,
        current: SimTime,
    ) -> TwinResult<BTreeSet<SituationId>> {
        let graph = Arc::clone(self.state.graph());

        self.observe(&graph, observed, current);
        let propagated = self.propagate(&graph, current);
        let undetermined = self.mark_undetermined(&graph);
        let refined = if undetermined > 0 {
            self.refine(current)?
        } else {
            0
        };

        let newly: BTreeSet<SituationId> = graph
            .bottom_layer()
            .order
            .iter()
            .copied()
            .filter(|id| {
                self.state.instance(*id).is_some_and(|i| {
                    i.state == SituationState::Triggered && i.next_start == current
                })
            })
            .collect();

        let expired = self.check_state(current);
        info!(
            current,
            observed = observed.len(),
            propagated,
            undetermined,
            refined,
            operational = newly.len(),
            expired,
            "reasoning slice"
        );
        Ok(newly)
    }

    /// Force every instance whose lifecycle has elapsed back to untriggered.
    /// Returns how many instances changed state.
    pub fn check_state(&mut self, current: SimTime) -> usize {
        let mut expired = 0;
        for instance in self.state.arena_mut().iter_mut() {
            if instance.lifecycle_elapsed(current) && instance.state != SituationState::Untriggered {
                instance.state = SituationState::Untriggered;
                expired += 1;
                debug!(id = instance.id, current, "situation expired");
            }
        }
        expired
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    fn observe(&mut self, graph: &SituationGraph, observed: &BTreeSet<SituationId>, current: SimTime) {
        for id in observed {
            if !graph.is_operational(*id) {
                warn!(id, "ignoring observation of a non-operational situation");
                continue;
            }
            if let Some(instance) = self.state.instance_mut(*id) {
                instance.occur(SituationState::Triggered, current);
            }
        }
    }

    /// Strict AND over evidences, layer by layer from just above the bottom.
    /// A node without evidences satisfies the AND vacuously.
    fn propagate(&mut self, graph: &SituationGraph, current: SimTime) -> usize {
        let mut propagated = 0;
        for layer in graph.layers()[..graph.bottom_index()].iter().rev() {
            for id in &layer.order {
                let Some(node) = graph.node(*id) else {
                    continue;
                };
                let own = self.state.counter(*id);
                let ready = node
                    .evidences
                    .iter()
                    .all(|evidence| self.state.counter(*evidence) > own);
                if ready {
                    if let Some(instance) = self.state.instance_mut(*id) {
                        instance.occur(SituationState::Triggered, current);
                        propagated += 1;
                        debug!(id, counter = instance.counter, "situation propagated");
                    }
                }
            }
        }
        propagated
    }

    /// Causes lagging a triggered or undetermined effect become undetermined.
    fn mark_undetermined(&mut self, graph: &SituationGraph) -> usize {
        for layer in graph.layers() {
            for id in layer.order.iter().rev() {
                let Some(effect) = self.state.instance(*id) else {
                    continue;
                };
                if !matches!(
                    effect.state,
                    SituationState::Triggered | SituationState::Undetermined
                ) {
                    continue;
                }
                let own = effect.counter;
                let Some(node) = graph.node(*id) else {
                    continue;
                };
                for cause in &node.causes {
                    if let Some(instance) = self.state.instance_mut(*cause) {
                        if instance.counter < own {
                            instance.state = SituationState::Undetermined;
                            debug!(id = cause, effect = id, "cause undetermined");
                        }
                    }
                }
            }
        }
        self.state
            .arena()
            .iter()
            .filter(|i| i.state == SituationState::Undetermined)
            .count()
    }

    /// Resolve undetermined instances against their posteriors.
    fn refine(&mut self, current: SimTime) -> TwinResult<usize> {
        let posteriors = self.engine.infer(&self.state.evidence())?;
        let mut committed = 0;
        for (id, probability) in posteriors.iter() {
            let Some(instance) = self.state.instance_mut(id) else {
                continue;
            };
            if instance.state != SituationState::Undetermined {
                continue;
            }
            if probability >= instance.threshold {
                instance.occur(SituationState::Triggering, current);
                committed += 1;
            } else {
                instance.state = SituationState::Untriggered;
            }
            debug!(id, probability, state = %instance.state, "situation refined");
        }
        Ok(committed)
    }
}

impl Evolution for SituationReasoner {
    type Input = BTreeSet<SituationId>;
    type Output = BTreeSet<SituationId>;

    fn step(&mut self, input: Self::Input, current: SimTime) -> TwinResult<Self::Output> {
        self.reason(&input, current)
    }

    fn evolution(&self) -> &SituationEvolution {
        &self.state
    }
}
