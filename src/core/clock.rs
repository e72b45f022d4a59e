//! Time Sources
//!
//! The engine never reads a global timer. Callers hold a [`Clock`] and pass
//! `clock.now_ms()` into each tick, or let a
//! [`GameSession`](crate::game::session::GameSession) do it for them.

use std::cell::Cell;
use std::time::Instant;

/// Milliseconds since an arbitrary, fixed origin.
pub type Millis = u64;

/// Source of monotonic milliseconds.
pub trait Clock {
    /// Current time. Never decreases under normal operation.
    fn now_ms(&self) -> Millis;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_ms(&self) -> Millis {
        (**self).now_ms()
    }
}

// =============================================================================
// SYSTEM CLOCK
// =============================================================================

/// Wall-clock source backed by [`Instant`].
///
/// Reports milliseconds elapsed since the clock was created.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose zero is "now".
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        // u64 millis covers ~584 million years
        self.origin.elapsed().as_millis() as Millis
    }
}

// =============================================================================
// FAKE CLOCK
// =============================================================================

/// Settable clock for deterministic tests and demos.
///
/// Interior mutability lets the test keep advancing time while a
/// [`GameSession`](crate::game::session::GameSession) borrows the clock.
#[derive(Debug, Default)]
pub struct FakeClock {
    now: Cell<Millis>,
}

impl FakeClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock at the given time.
    pub fn at(ms: Millis) -> Self {
        Self { now: Cell::new(ms) }
    }

    /// Jump to an absolute time.
    pub fn set(&self, ms: Millis) {
        self.now.set(ms);
    }

    /// Move time forward, returning the new time.
    pub fn advance(&self, ms: Millis) -> Millis {
        let next = self.now.get().saturating_add(ms);
        self.now.set(next);
        next
    }
}

impl Clock for FakeClock {
    #[inline]
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}
