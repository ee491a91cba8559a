//! Decision clocks.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Source of the current instant used by admission decisions.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Useful for simulating the passage of time without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    /// Set the clock to `origin + offset`.
    pub fn set(&self, offset: Duration) {
        *self.offset.lock() = offset;
    }

    /// The instant this clock started at.
    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_starts_at_origin() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), clock.origin());
    }

    #[test]
    fn test_manual_clock_advance_and_set() {
        let clock = ManualClock::new();

        clock.advance(Duration::from_secs(5));
        clock.advance(Duration::from_secs(2));
        assert_eq!(clock.now() - clock.origin(), Duration::from_secs(7));

        clock.set(Duration::from_secs(1));
        assert_eq!(clock.now() - clock.origin(), Duration::from_secs(1));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
