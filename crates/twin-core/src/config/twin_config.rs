//! Top-level twinsync configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ArrangerConfig, ObservabilityConfig, ReasonerConfig, SyncConfig};
use crate::constants::ENV_PREFIX;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`TWINSYNC_*`)
/// 2. TOML file passed to [`TwinConfig::load`]
/// 3. Compiled defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TwinConfig {
    pub arranger: ArrangerConfig,
    pub reasoner: ReasonerConfig,
    pub sync: SyncConfig,
    pub observability: ObservabilityConfig,
}

impl TwinConfig {
    /// Load configuration from an optional TOML file plus environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    })?;
                toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup. Keys are upper-case without the
    /// `TWINSYNC_` prefix, e.g. `SLICE_CYCLE_MS`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("TRIGGER_PROBABILITY") {
            self.arranger.trigger_probability = parse_field("TRIGGER_PROBABILITY", &val)?;
        }
        if let Some(val) = lookup("MAX_TRIGGER_LIMIT") {
            self.arranger.max_trigger_limit = parse_field("MAX_TRIGGER_LIMIT", &val)?;
        }
        if let Some(val) = lookup("SEED") {
            self.arranger.seed = Some(parse_field("SEED", &val)?);
        }
        if let Some(val) = lookup("DEFAULT_THRESHOLD") {
            self.reasoner.default_threshold = parse_field("DEFAULT_THRESHOLD", &val)?;
        }
        if let Some(val) = lookup("MAX_CLIQUE_SIZE") {
            self.reasoner.max_clique_size = parse_field("MAX_CLIQUE_SIZE", &val)?;
        }
        if let Some(val) = lookup("EVENT_CYCLE_MS") {
            self.sync.event_cycle_ms = parse_field("EVENT_CYCLE_MS", &val)?;
        }
        if let Some(val) = lookup("CHECK_CYCLE_MS") {
            self.sync.check_cycle_ms = parse_field("CHECK_CYCLE_MS", &val)?;
        }
        if let Some(val) = lookup("SLICE_CYCLE_MS") {
            self.sync.slice_cycle_ms = parse_field("SLICE_CYCLE_MS", &val)?;
        }
        if let Some(val) = lookup("RUN_UNTIL_MS") {
            self.sync.run_until_ms = parse_field("RUN_UNTIL_MS", &val)?;
        }
        if let Some(val) = lookup("CHANNEL_LATENCY_MS") {
            self.sync.channel_latency_ms = parse_field("CHANNEL_LATENCY_MS", &val)?;
        }
        if let Some(val) = lookup("LOG_LEVEL") {
            self.observability.log_level = val;
        }
        Ok(())
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.arranger.trigger_probability) {
            return Err(ConfigError::ValidationFailed {
                field: "arranger.trigger_probability".to_string(),
                message: "must be between 0.0 and 1.0".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.reasoner.default_threshold) {
            return Err(ConfigError::ValidationFailed {
                field: "reasoner.default_threshold".to_string(),
                message: "must be between 0.0 and 1.0".to_string(),
            });
        }
        if self.reasoner.max_clique_size == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "reasoner.max_clique_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        for (field, value) in [
            ("sync.event_cycle_ms", self.sync.event_cycle_ms),
            ("sync.slice_cycle_ms", self.sync.slice_cycle_ms),
            ("sync.check_cycle_ms", self.sync.check_cycle_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn parse_field<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::ValidationFailed {
            field: format!("{ENV_PREFIX}{key}"),
            message: e.to_string(),
        })
}
