//! Causal-network inference errors.

use crate::models::SituationId;

/// Errors raised while building or querying the causal network.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("situation {0} is not part of the causal network")]
    UnknownSituation(SituationId),

    #[error("situation {id} has {count} parents, at most {max} are supported")]
    TooManyParents {
        id: SituationId,
        count: usize,
        max: usize,
    },

    #[error("junction tree clique of {size} variables exceeds the limit of {max}")]
    CliqueTooLarge { size: usize, max: usize },

    #[error("no junction tree clique covers the family of situation {0}")]
    UncoveredFamily(SituationId),

    #[error("evidence vector has {got} entries, network has {expected} nodes")]
    EvidenceShape { expected: usize, got: usize },
}
