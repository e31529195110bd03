//! # twin-sync
//!
//! Synchronization between the physical side and its twin: occurrence wire
//! messages, the fidelity reconciler, the event-source and synchronizer
//! hosts, and a deterministic single-threaded host that runs both.

pub mod channel;
pub mod host;
pub mod message;
pub mod reconciler;
pub mod source;
pub mod synchronizer;

pub use channel::{DelayedChannel, ManualClock};
pub use host::{RunReport, SimulationHost};
pub use message::OccurrenceMessage;
pub use reconciler::{FidelityReport, Reconciler};
pub use source::EventSource;
pub use synchronizer::Synchronizer;
