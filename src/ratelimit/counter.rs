//! Per-client counter state machine.

use std::time::{Duration, Instant};

/// Outcome of a single admission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// First request ever seen from this client.
    FirstSeen,
    /// The previous window expired and the counter started over.
    Reset,
    /// Admitted within the active window; `count` is the new total.
    Admitted { count: u32 },
    /// The client is at its limit and the window is still active.
    Exceeded,
}

impl Decision {
    /// Whether the request may proceed.
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Decision::Exceeded)
    }
}

/// A copy of a client's counter at some point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Admitted requests in the current window
    pub count: u32,
    /// Instant of the most recent admission, which anchors the window
    pub window_start: Instant,
}

/// Mutable record tracking one client's admissions.
///
/// `count` is at least 1 once the record exists and never exceeds the
/// limit it is observed with.
#[derive(Debug)]
pub(crate) struct ClientCounter {
    count: u32,
    window_start: Instant,
}

impl ClientCounter {
    /// Counter for a client whose first request arrived at `now`.
    pub(crate) fn new(now: Instant) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }

    /// Apply one request arriving at `now` to an existing counter.
    ///
    /// The window is anchored to the most recent admission, so every
    /// admitted request pushes the reset point further out. A request at
    /// exactly `window` after the anchor still belongs to the old window.
    pub(crate) fn observe(&mut self, now: Instant, limit: u32, window: Duration) -> Decision {
        let elapsed = now.saturating_duration_since(self.window_start);

        if elapsed > window {
            self.count = 1;
            self.window_start = now;
            return Decision::Reset;
        }

        if self.count < limit {
            self.count += 1;
            self.window_start = now;
            return Decision::Admitted { count: self.count };
        }

        Decision::Exceeded
    }

    pub(crate) fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            count: self.count,
            window_start: self.window_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(10);

    #[test]
    fn test_new_counter_starts_at_one() {
        let now = Instant::now();
        let counter = ClientCounter::new(now);

        let snapshot = counter.snapshot();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.window_start, now);
    }

    #[test]
    fn test_observe_increments_and_slides_window() {
        let start = Instant::now();
        let mut counter = ClientCounter::new(start);

        let later = start + Duration::from_secs(3);
        assert_eq!(
            counter.observe(later, 3, WINDOW),
            Decision::Admitted { count: 2 }
        );
        assert_eq!(counter.snapshot().window_start, later);
    }

    #[test]
    fn test_observe_denies_at_limit_without_mutation() {
        let start = Instant::now();
        let mut counter = ClientCounter::new(start);
        counter.observe(start, 2, WINDOW);

        let before = counter.snapshot();
        assert_eq!(
            counter.observe(start + Duration::from_secs(1), 2, WINDOW),
            Decision::Exceeded
        );
        assert_eq!(counter.snapshot(), before);
    }

    #[test]
    fn test_observe_exact_window_keeps_old_window() {
        let start = Instant::now();
        let mut counter = ClientCounter::new(start);

        assert_eq!(counter.observe(start + WINDOW, 1, WINDOW), Decision::Exceeded);
    }

    #[test]
    fn test_observe_resets_after_window() {
        let start = Instant::now();
        let mut counter = ClientCounter::new(start);

        let later = start + WINDOW + Duration::from_millis(1);
        assert_eq!(counter.observe(later, 1, WINDOW), Decision::Reset);
        assert_eq!(counter.snapshot().count, 1);
        assert_eq!(counter.snapshot().window_start, later);
    }

    #[test]
    fn test_observe_clock_behind_anchor_counts_as_zero_elapsed() {
        let start = Instant::now() + Duration::from_secs(60);
        let mut counter = ClientCounter::new(start);

        assert_eq!(
            counter.observe(start - Duration::from_secs(30), 5, WINDOW),
            Decision::Admitted { count: 2 }
        );
    }

    #[test]
    fn test_decision_is_allowed() {
        assert!(Decision::FirstSeen.is_allowed());
        assert!(Decision::Reset.is_allowed());
        assert!(Decision::Admitted { count: 4 }.is_allowed());
        assert!(!Decision::Exceeded.is_allowed());
    }
}
