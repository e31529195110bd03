//! # twin-core
//!
//! Foundation crate for the twinsync digital-twin core.
//! Defines the situation ids, instance state, operation records, errors,
//! config, constants, and the host-facing clock/channel traits.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod tracing_setup;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::TwinConfig;
pub use errors::{TwinError, TwinResult};
pub use models::{
    CauseCounts, Combination, OccurrenceRecord, PhysicalOperation, RelationKind, SimTime,
    SituationId, SituationInstance, SituationState, SituationType, VirtualOperation,
};
