//! Physical-side host: drives the arranger and publishes its occurrences.

use tracing::{info, warn};

use twin_core::traits::Channel;
use twin_core::SimTime;
use twin_evolution::{Evolution, SituationArranger};

use crate::message::OccurrenceMessage;

#[derive(Debug)]
pub struct EventSource {
    arranger: SituationArranger,
    total_operations: u64,
    total_situations: u64,
}

impl EventSource {
    pub fn new(arranger: SituationArranger) -> Self {
        Self {
            arranger,
            total_operations: 0,
            total_situations: 0,
        }
    }

    pub fn arranger(&self) -> &SituationArranger {
        &self.arranger
    }

    /// Records sent so far.
    pub fn total_operations(&self) -> u64 {
        self.total_operations
    }

    /// Triggering records sent so far.
    pub fn total_situations(&self) -> u64 {
        self.total_situations
    }

    pub fn consistent_count(&self) -> usize {
        self.arranger.consistent_count()
    }

    /// Run one generation tick and send every record. Returns the number sent.
    pub fn generate<C>(&mut self, current: SimTime, channel: &mut C) -> usize
    where
        C: Channel<OccurrenceMessage>,
    {
        let records = self.arranger.occurrences(current);
        let mut sent = 0;
        let mut triggering = 0;
        for record in &records {
            let message = match OccurrenceMessage::from_record(record) {
                Ok(message) => message,
                Err(e) => {
                    warn!(id = record.id(), error = %e, "occurrence not encodable, dropped");
                    continue;
                }
            };
            if message.triggered {
                triggering += 1;
            }
            channel.send(current, message);
            sent += 1;
        }

        self.total_operations += sent as u64;
        self.total_situations += triggering;
        if triggering > 0 {
            info!(current, sent, triggering, "occurrences published");
        }
        sent
    }
}
