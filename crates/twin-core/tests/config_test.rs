use std::collections::HashMap;
use std::io::Write;

use twin_core::config::*;
use twin_core::errors::ConfigError;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = TwinConfig::from_toml("").unwrap();

    assert_eq!(config.arranger.trigger_probability, 1.0);
    assert_eq!(config.arranger.max_trigger_limit, 4);
    assert!(config.arranger.seed.is_none());

    assert_eq!(config.reasoner.default_threshold, 0.5);
    assert_eq!(config.reasoner.max_clique_size, 20);

    assert_eq!(config.sync.event_cycle_ms, 500);
    assert_eq!(config.sync.slice_cycle_ms, 3_000);
    assert_eq!(config.sync.check_cycle_ms, 500);
    assert_eq!(config.sync.channel_latency_ms, 0);

    assert_eq!(config.observability.log_level, "info");
    assert!(!config.observability.json);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[arranger]
trigger_probability = 0.25
seed = 7

[sync]
slice_cycle_ms = 1000
"#;
    let config = TwinConfig::from_toml(toml).unwrap();
    assert_eq!(config.arranger.trigger_probability, 0.25);
    assert_eq!(config.arranger.seed, Some(7));
    assert_eq!(config.sync.slice_cycle_ms, 1000);
    // Non-overridden fields keep defaults
    assert_eq!(config.arranger.max_trigger_limit, 4);
    assert_eq!(config.sync.event_cycle_ms, 500);
}

#[test]
fn config_rejects_probability_out_of_range() {
    let err = TwinConfig::from_toml("[arranger]\ntrigger_probability = 1.5\n").unwrap_err();
    match err {
        ConfigError::ValidationFailed { field, .. } => {
            assert_eq!(field, "arranger.trigger_probability")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn config_rejects_zero_slice_cycle() {
    let err = TwinConfig::from_toml("[sync]\nslice_cycle_ms = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "sync.slice_cycle_ms"));
}

#[test]
fn config_reports_parse_errors() {
    let err = TwinConfig::from_toml("[sync\nslice_cycle_ms = ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn overrides_take_priority_over_file_values() {
    let mut config = TwinConfig::from_toml("[sync]\nrun_until_ms = 1000\n").unwrap();
    let env: HashMap<&str, &str> = [("RUN_UNTIL_MS", "9000"), ("SEED", "42"), ("LOG_LEVEL", "debug")]
        .into_iter()
        .collect();
    config
        .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(config.sync.run_until_ms, 9000);
    assert_eq!(config.arranger.seed, Some(42));
    assert_eq!(config.observability.log_level, "debug");
}

#[test]
fn every_cycle_and_limit_can_be_overridden() {
    let mut config = TwinConfig::default();
    let env: HashMap<&str, &str> = [
        ("EVENT_CYCLE_MS", "250"),
        ("CHECK_CYCLE_MS", "750"),
        ("MAX_TRIGGER_LIMIT", "9"),
        ("MAX_CLIQUE_SIZE", "12"),
    ]
    .into_iter()
    .collect();
    config
        .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(config.sync.event_cycle_ms, 250);
    assert_eq!(config.sync.check_cycle_ms, 750);
    assert_eq!(config.arranger.max_trigger_limit, 9);
    assert_eq!(config.reasoner.max_clique_size, 12);

    // A zero cycle from the environment still fails validation.
    config
        .apply_overrides(|key| (key == "CHECK_CYCLE_MS").then(|| "0".to_string()))
        .unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationFailed { ref field, .. }) if field == "sync.check_cycle_ms"
    ));
}

#[test]
fn malformed_override_is_a_validation_error() {
    let mut config = TwinConfig::default();
    let err = config
        .apply_overrides(|key| (key == "SLICE_CYCLE_MS").then(|| "soon".to_string()))
        .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "TWINSYNC_SLICE_CYCLE_MS"));
}

#[test]
fn load_reads_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[reasoner]\ndefault_threshold = 0.7").unwrap();
    let config = TwinConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.reasoner.default_threshold, 0.7);
}

#[test]
fn load_missing_file_is_reported() {
    let err = TwinConfig::load(Some(std::path::Path::new("/nonexistent/twinsync.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}
