//! Test fixture loader for twinsync situation models.
//!
//! Fixture files live under `models/` next to this crate's manifest, so the
//! paths resolve the same way from every crate in the workspace.

use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// 1 top situation governing 3 operational situations, weights 0.5.
pub const TWO_LAYER: &str = "models/two_layer.json";
/// 3 layers with a causal chain 1 -> 2 -> 3 on top and a separate hierarchy.
pub const CHAIN_THREE_LAYER: &str = "models/chain_three_layer.json";
/// Two causally linked top situations whose operational children inherit the order.
pub const CAUSAL_PIPELINE: &str = "models/causal_pipeline.json";
/// 3-layer home-monitoring model with a hidden sensor, for full simulation runs.
pub const SMART_HOME: &str = "models/smart_home.json";

/// Root directory of the fixture files.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// Raw text of a fixture file.
///
/// # Panics
/// Panics if the file doesn't exist.
pub fn load_fixture_str(relative_path: &str) -> String {
    let path = fixture_path(relative_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let content = load_fixture_str(relative_path);
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", relative_path, e))
}

/// Load a fixture file as raw JSON Value.
pub fn load_fixture_value(relative_path: &str) -> serde_json::Value {
    load_fixture(relative_path)
}

/// List all JSON files in a fixture subdirectory, sorted by name.
pub fn list_fixtures(subdir: &str) -> Vec<PathBuf> {
    let dir = fixtures_root().join(subdir);
    let Ok(entries) = std::fs::read_dir(&dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}
