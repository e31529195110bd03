use crate::models::SimTime;

/// Simulation clock provided by the host.
///
/// The host delivers timed callbacks; engines only ever read the current time.
pub trait Clock {
    /// Current simulation time.
    fn now(&self) -> SimTime;
}
