use serde::{Deserialize, Serialize};

use super::defaults;

/// Timing of the simulation host, all values in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Period of the event source's generation tick.
    pub event_cycle_ms: u64,
    /// Length of one reasoning slice.
    pub slice_cycle_ms: u64,
    /// Period of the lifecycle expiry check.
    pub check_cycle_ms: u64,
    /// Fixed delivery delay of the in-memory channels.
    pub channel_latency_ms: u64,
    /// Simulation end time.
    pub run_until_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            event_cycle_ms: defaults::DEFAULT_EVENT_CYCLE_MS,
            slice_cycle_ms: defaults::DEFAULT_SLICE_CYCLE_MS,
            check_cycle_ms: defaults::DEFAULT_CHECK_CYCLE_MS,
            channel_latency_ms: defaults::DEFAULT_CHANNEL_LATENCY_MS,
            run_until_ms: defaults::DEFAULT_RUN_UNTIL_MS,
        }
    }
}
