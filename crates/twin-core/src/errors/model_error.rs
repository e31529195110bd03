//! Situation model errors. All of them are fatal at load time.

use crate::models::SituationId;

/// Malformed or self-inconsistent model description.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("cannot read model {path}: {message}")]
    Io { path: String, message: String },

    #[error("malformed model document: {message}")]
    Parse { message: String },

    #[error("model has no layers or no situations")]
    EmptyModel,

    #[error("situation {0} is defined more than once")]
    DuplicateSituation(SituationId),

    #[error("situation {from} references undefined situation {to}")]
    UndefinedReference { from: SituationId, to: SituationId },

    #[error("relation {src} -> {dest} has unknown combination code {code}")]
    InvalidRelation {
        src: SituationId,
        dest: SituationId,
        code: i64,
    },

    #[error("situation {id} has unknown observability type {code}")]
    InvalidObservability { id: SituationId, code: i64 },

    #[error("relation {src} -> {dest} has weight {weight} outside [0, 1]")]
    InvalidWeight {
        src: SituationId,
        dest: SituationId,
        weight: f64,
    },

    #[error("situation {id} has inference threshold {value} outside [0, 1]")]
    InvalidThreshold { id: SituationId, value: f64 },

    #[error("cause {cause} of situation {effect} lives in a different layer")]
    CrossLayerCause {
        cause: SituationId,
        effect: SituationId,
    },

    #[error("evidence {child} of situation {parent} is not in a deeper layer")]
    EvidenceNotBelow {
        parent: SituationId,
        child: SituationId,
    },

    #[error("causal cycle in layer {layer} through situation {id}")]
    CyclicLayer { layer: usize, id: SituationId },

    #[error("situation {id} has {count} causes, at most {max} are supported")]
    TooManyCauses {
        id: SituationId,
        count: usize,
        max: usize,
    },
}
