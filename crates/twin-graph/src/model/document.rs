//! Serde schema of the layered JSON model description.

use serde::{Deserialize, Serialize};

use twin_core::errors::ModelError;
use twin_core::models::Combination;
use twin_core::{SimTime, SituationId, SituationType};

use super::builder::{Link, SituationGraphBuilder, SituationSpec};

/// `{ "layers": [ [node, ...], ... ] }`, layer 0 on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDocument {
    pub layers: Vec<Vec<NodeDocument>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDocument {
    #[serde(rename = "ID")]
    pub id: SituationId,
    #[serde(rename = "Duration")]
    pub duration: f64,
    #[serde(rename = "Cycle", default)]
    pub cycle: Option<f64>,
    #[serde(rename = "type")]
    pub kind: i64,
    #[serde(rename = "Threshold", default)]
    pub threshold: Option<f64>,
    #[serde(rename = "Predecessors", default)]
    pub predecessors: Option<Vec<PredecessorDocument>>,
    #[serde(rename = "Children", default)]
    pub children: Option<Vec<ChildDocument>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredecessorDocument {
    #[serde(rename = "ID")]
    pub id: SituationId,
    #[serde(rename = "Relation")]
    pub relation: i64,
    #[serde(rename = "Weight-x")]
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildDocument {
    #[serde(rename = "ID")]
    pub id: SituationId,
    #[serde(rename = "Relation")]
    pub relation: i64,
    #[serde(rename = "Weight-y")]
    pub weight: f64,
}

impl ModelDocument {
    /// Convert into a builder, decoding the numeric codes.
    pub fn into_builder(self) -> Result<SituationGraphBuilder, ModelError> {
        let mut builder = SituationGraphBuilder::new();
        for layer in self.layers {
            let specs = layer
                .into_iter()
                .map(NodeDocument::into_spec)
                .collect::<Result<Vec<_>, _>>()?;
            builder.push_layer(specs);
        }
        Ok(builder)
    }
}

impl NodeDocument {
    fn into_spec(self) -> Result<SituationSpec, ModelError> {
        let kind = SituationType::from_code(self.kind).ok_or(ModelError::InvalidObservability {
            id: self.id,
            code: self.kind,
        })?;

        let mut causes = Vec::new();
        for pre in self.predecessors.unwrap_or_default() {
            causes.push(Link {
                id: pre.id,
                combination: decode_combination(pre.id, self.id, pre.relation)?,
                weight: pre.weight,
            });
        }

        let mut evidences = Vec::new();
        for child in self.children.unwrap_or_default() {
            evidences.push(Link {
                id: child.id,
                combination: decode_combination(child.id, self.id, child.relation)?,
                weight: child.weight,
            });
        }

        Ok(SituationSpec {
            id: self.id,
            kind,
            duration: to_time(self.id, "Duration", self.duration)?,
            cycle: self
                .cycle
                .map(|c| to_time(self.id, "Cycle", c))
                .transpose()?,
            threshold: self.threshold,
            causes,
            evidences,
        })
    }
}

fn decode_combination(
    src: SituationId,
    dest: SituationId,
    code: i64,
) -> Result<Combination, ModelError> {
    Combination::from_code(code).ok_or(ModelError::InvalidRelation { src, dest, code })
}

fn to_time(id: SituationId, field: &str, value: f64) -> Result<SimTime, ModelError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value.round() as SimTime)
    } else {
        Err(ModelError::Parse {
            message: format!("situation {id}: {field} must be a non-negative number, got {value}"),
        })
    }
}
