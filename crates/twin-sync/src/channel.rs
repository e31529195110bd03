//! In-memory clock and fixed-latency channel for the simulation host.

use std::collections::VecDeque;

use twin_core::traits::{Channel, Clock};
use twin_core::SimTime;

/// Clock advanced explicitly by the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: SimTime,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward to `time`. Never moves backwards.
    pub fn advance_to(&mut self, time: SimTime) {
        self.now = self.now.max(time);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SimTime {
        self.now
    }
}

/// FIFO channel delivering each payload `latency` after it was sent.
#[derive(Debug, Clone)]
pub struct DelayedChannel<T> {
    latency: SimTime,
    in_flight: VecDeque<(SimTime, T)>,
}

impl<T> DelayedChannel<T> {
    pub fn new(latency: SimTime) -> Self {
        Self {
            latency,
            in_flight: VecDeque::new(),
        }
    }

    pub fn latency(&self) -> SimTime {
        self.latency
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

impl<T> Channel<T> for DelayedChannel<T> {
    fn send(&mut self, now: SimTime, payload: T) {
        let due = now + self.latency;
        // Keep the queue sorted even if a caller sends out of time order.
        let position = self.in_flight.partition_point(|(t, _)| *t <= due);
        self.in_flight.insert(position, (due, payload));
    }

    fn receive_due(&mut self, now: SimTime) -> Vec<T> {
        let count = self.in_flight.partition_point(|(t, _)| *t <= now);
        self.in_flight.drain(..count).map(|(_, payload)| payload).collect()
    }

    fn next_delivery(&self) -> Option<SimTime> {
        self.in_flight.front().map(|(t, _)| *t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_after_latency_in_send_order() {
        let mut channel = DelayedChannel::new(100);
        channel.send(0, "a");
        channel.send(50, "b");
        channel.send(50, "c");
        assert_eq!(channel.next_delivery(), Some(100));
        assert!(channel.receive_due(99).is_empty());
        assert_eq!(channel.receive_due(100), vec!["a"]);
        assert_eq!(channel.receive_due(1_000), vec!["b", "c"]);
        assert!(channel.is_empty());
        assert_eq!(channel.next_delivery(), None);
    }

    #[test]
    fn zero_latency_is_immediately_due() {
        let mut channel = DelayedChannel::new(0);
        channel.send(10, 1);
        assert_eq!(channel.receive_due(10), vec![1]);
    }

    #[test]
    fn clock_only_moves_forward() {
        let mut clock = ManualClock::new();
        clock.advance_to(10);
        clock.advance_to(5);
        assert_eq!(clock.now(), 10);
    }
}
