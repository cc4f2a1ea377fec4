//! Game clock abstraction.
//!
//! The engine never reads wall time. Every decay operation takes its `now`
//! from a [`Clock`], and each logical operation reads it exactly once so that
//! reconstruct and commit always see the same instant.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic game clock in milliseconds.
pub trait Clock: Send + Sync {
    /// Returns the current game time in milliseconds.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// A clock that only moves when told to.
///
/// Hosts with their own game loop call [`ManualClock::set`] once per frame;
/// tests use [`ManualClock::advance`] to step through scenarios.
///
/// # Example
///
/// ```
/// use hunger_core::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000);
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1_500);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a clock reading `start_ms`.
    #[must_use]
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    /// Sets the current time.
    ///
    /// Setting an earlier time is allowed here; the engine rejects the
    /// regression when it next touches a state stamped later.
    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    /// Moves the clock forward by `delta_ms`.
    pub fn advance(&self, delta_ms: u64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_set_and_advance() {
        let clock = ManualClock::new(0);
        assert_eq!(clock.now_ms(), 0);
        clock.advance(250);
        clock.advance(250);
        assert_eq!(clock.now_ms(), 500);
        clock.set(10_000);
        assert_eq!(clock.now_ms(), 10_000);
    }

    #[test]
    fn shared_clock_reads_through_arc() {
        let clock = Arc::new(ManualClock::new(42));
        let shared: Arc<dyn Clock> = clock.clone();
        clock.advance(8);
        assert_eq!(shared.now_ms(), 50);
    }
}
