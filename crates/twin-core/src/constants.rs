/// twinsync version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of causal predecessors per situation.
/// A node with k causes owns a CPT of 2^k rows.
pub const MAX_CAUSES_PER_SITUATION: usize = 20;

/// Prior P(node=1) for a situation without causes.
pub const ROOT_PRIOR: f64 = 0.5;

/// Environment variable read by the tracing setup.
pub const LOG_ENV_VAR: &str = "TWINSYNC_LOG";

/// Prefix of every environment override read by the config loader.
pub const ENV_PREFIX: &str = "TWINSYNC_";
