//! Core primitives.
//!
//! Time is the only thing the engine takes from outside the game state, and
//! it always arrives through a [`Clock`].

pub mod clock;

// Re-export core types
pub use clock::{Clock, FakeClock, Millis, SystemClock};
