// Single source of truth for all default values.

// --- Arranger ---
pub const DEFAULT_TRIGGER_PROBABILITY: f64 = 1.0;
pub const DEFAULT_MAX_TRIGGER_LIMIT: u32 = 4;

// --- Reasoner ---
pub const DEFAULT_INFERENCE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_MAX_CLIQUE_SIZE: usize = 20;

// --- Sync (milliseconds) ---
pub const DEFAULT_EVENT_CYCLE_MS: u64 = 500;
pub const DEFAULT_SLICE_CYCLE_MS: u64 = 3_000;
pub const DEFAULT_CHECK_CYCLE_MS: u64 = 500;
pub const DEFAULT_CHANNEL_LATENCY_MS: u64 = 0;
pub const DEFAULT_RUN_UNTIL_MS: u64 = 60_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
