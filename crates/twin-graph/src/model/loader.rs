//! Load a situation model from a JSON file or string.

use std::path::Path;

use tracing::info;

use twin_core::errors::ModelError;

use super::document::ModelDocument;
use crate::graph::situation_graph::SituationGraph;

/// Load and validate the model at `path`.
pub fn load_model(path: impl AsRef<Path>) -> Result<SituationGraph, ModelError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let graph = load_model_str(&content)?;
    info!(
        path = %path.display(),
        situations = graph.len(),
        layers = graph.height(),
        "situation model loaded"
    );
    Ok(graph)
}

/// Parse and validate a model from its JSON text.
pub fn load_model_str(json: &str) -> Result<SituationGraph, ModelError> {
    let document: ModelDocument = serde_json::from_str(json).map_err(|e| ModelError::Parse {
        message: e.to_string(),
    })?;
    document.into_builder()?.build()
}
