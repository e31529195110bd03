use crate::models::SimTime;

/// Asynchronous transport between a producer and its consumer.
///
/// Delivery may be delayed and may reorder payloads relative to their
/// generation order; consumers must key on content, not arrival order.
pub trait Channel<T> {
    /// Hand a payload to the channel at time `now`.
    fn send(&mut self, now: SimTime, payload: T);

    /// Take every payload whose delivery time is `<= now`.
    fn receive_due(&mut self, now: SimTime) -> Vec<T>;

    /// Earliest pending delivery time, if any payload is in flight.
    fn next_delivery(&self) -> Option<SimTime>;
}
