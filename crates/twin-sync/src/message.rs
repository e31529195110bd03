//! Wire form of an occurrence record.

use serde::{Deserialize, Serialize};

use twin_core::errors::RecordError;
use twin_core::{
    CauseCounts, OccurrenceRecord, PhysicalOperation, SimTime, SituationId, SituationType,
};

/// Occurrence as it travels over the channel. The cause-count map is carried
/// as a JSON object string keyed by situation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceMessage {
    pub id: SituationId,
    pub triggered: bool,
    pub timestamp: SimTime,
    #[serde(rename = "type")]
    pub kind: SituationType,
    pub counter: u32,
    pub cause_counts: String,
}

impl OccurrenceMessage {
    pub fn from_record(record: &OccurrenceRecord) -> Result<Self, RecordError> {
        let cause_counts = serde_json::to_string(&record.cause_counts).map_err(|e| {
            RecordError::MalformedCauseCounts {
                id: record.id(),
                message: e.to_string(),
            }
        })?;
        let op = &record.operation;
        Ok(Self {
            id: op.id,
            triggered: op.triggered,
            timestamp: op.timestamp,
            kind: op.kind,
            counter: op.counter,
            cause_counts,
        })
    }

    /// Decode the embedded cause-count map.
    pub fn cause_counts(&self) -> Result<CauseCounts, RecordError> {
        serde_json::from_str(&self.cause_counts).map_err(|e| RecordError::MalformedCauseCounts {
            id: self.id,
            message: e.to_string(),
        })
    }
}

impl TryFrom<OccurrenceMessage> for OccurrenceRecord {
    type Error = RecordError;

    fn try_from(message: OccurrenceMessage) -> Result<Self, Self::Error> {
        let cause_counts = message.cause_counts()?;
        Ok(OccurrenceRecord {
            operation: PhysicalOperation {
                id: message.id,
                timestamp: message.timestamp,
                triggered: message.triggered,
                kind: message.kind,
                counter: message.counter,
            },
            cause_counts,
        })
    }
}
