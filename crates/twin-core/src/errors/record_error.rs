//! Per-record errors raised while reconciling occurrence streams.
//! These reject a single record and never abort a run.

use crate::models::SituationId;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("occurrence of situation {id} carries an unparseable cause-count map: {message}")]
    MalformedCauseCounts { id: SituationId, message: String },

    #[error("occurrence references unknown situation {0}")]
    UnknownSituation(SituationId),
}
