//! Interfaces of the external collaborators driving the engines.

pub mod channel;
pub mod clock;

pub use channel::Channel;
pub use clock::Clock;
