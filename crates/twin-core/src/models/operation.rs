//! Emitted value records. Transient: handed to the channel right after creation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{SimTime, SituationId, SituationType};

/// Counter of every strict-cause situation at emission time.
pub type CauseCounts = BTreeMap<SituationId, u32>;

/// Ground-truth operation produced by the arranger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalOperation {
    pub id: SituationId,
    pub timestamp: SimTime,
    pub triggered: bool,
    pub kind: SituationType,
    /// Counter snapshot after this emission.
    pub counter: u32,
}

/// Twin-derived operation produced from a reasoner's newly-operational set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualOperation {
    pub id: SituationId,
    pub timestamp: SimTime,
    pub triggered: bool,
}

/// A physical operation plus the cause-count map used for alignment fidelity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceRecord {
    pub operation: PhysicalOperation,
    pub cause_counts: CauseCounts,
}

impl OccurrenceRecord {
    pub fn id(&self) -> SituationId {
        self.operation.id
    }

    pub fn triggered(&self) -> bool {
        self.operation.triggered
    }
}
