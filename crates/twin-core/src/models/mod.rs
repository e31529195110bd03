//! Domain records shared by the graph, the engines and the reconciler.

pub mod instance;
pub mod operation;
pub mod situation;

pub use instance::SituationInstance;
pub use operation::{CauseCounts, OccurrenceRecord, PhysicalOperation, VirtualOperation};
pub use situation::{Combination, RelationKind, SituationId, SituationState, SituationType};

/// Simulation time in milliseconds.
pub type SimTime = u64;
