//! Per-engine runtime record of a situation.

use serde::{Deserialize, Serialize};

use super::{SimTime, SituationId, SituationState, SituationType};

/// Runtime state of one situation inside one engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SituationInstance {
    pub id: SituationId,
    pub kind: SituationType,
    pub state: SituationState,
    /// Completed trigger cycles. Never decreases.
    pub counter: u32,
    /// Lifecycle length after a start.
    pub duration: SimTime,
    /// Sampling / restart period. `None` for non-periodic situations.
    pub cycle: Option<SimTime>,
    /// Earliest time the next lifecycle may start.
    pub next_start: SimTime,
    /// Probability cutoff used by the refinement stage.
    pub threshold: f64,
}

impl SituationInstance {
    pub fn new(
        id: SituationId,
        kind: SituationType,
        duration: SimTime,
        cycle: Option<SimTime>,
        threshold: f64,
    ) -> Self {
        Self {
            id,
            kind,
            state: SituationState::Untriggered,
            counter: 0,
            duration,
            cycle,
            next_start: 0,
            threshold,
        }
    }

    /// Mark as occurred at `current`: counter++ and restart the lifecycle.
    pub fn occur(&mut self, state: SituationState, current: SimTime) {
        self.state = state;
        self.counter += 1;
        self.next_start = current;
    }

    /// `next_start + duration <= current`.
    pub fn lifecycle_elapsed(&self, current: SimTime) -> bool {
        self.next_start.saturating_add(self.duration) <= current
    }

    /// Periodic alignment: `current mod cycle == 0`. Non-periodic never aligns.
    pub fn aligned(&self, current: SimTime) -> bool {
        match self.cycle {
            Some(cycle) if cycle > 0 => current % cycle == 0,
            _ => false,
        }
    }

    /// Cycle period, 0 when non-periodic.
    pub fn cycle_or_zero(&self) -> SimTime {
        self.cycle.unwrap_or(0)
    }

    /// Restore the freshly-loaded state.
    pub fn reset(&mut self) {
        self.state = SituationState::Untriggered;
        self.counter = 0;
        self.next_start = 0;
    }
}
