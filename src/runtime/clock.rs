use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// Source of "now" for every engine decision.
///
/// Suppression windows and trigger thresholds work on epoch milliseconds;
/// countdown targets and publish dates are naive local datetimes because the
/// server emits local-time strings with no zone information.
pub trait Clock: Send + Sync {
    /// Current time as Unix epoch milliseconds.
    fn now_ms(&self) -> i64;

    /// Current local wall-clock time.
    fn now_local(&self) -> NaiveDateTime;
}

/// Clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Manually driven clock for deterministic runs.
///
/// Local time is derived from the epoch-millisecond counter, so advancing
/// the clock moves both views in lockstep.
#[derive(Debug)]
pub struct ManualClock {
    ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            ms: AtomicI64::new(start_ms),
        }
    }

    pub fn advance_ms(&self, delta: i64) {
        self.ms.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn set_ms(&self, now_ms: i64) {
        self.ms.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.ms.load(Ordering::SeqCst)
    }

    fn now_local(&self) -> NaiveDateTime {
        DateTime::<Utc>::from_timestamp_millis(self.now_ms())
            .map(|dt| dt.naive_utc())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances_both_views() {
        let clock = ManualClock::new(1_000_000);
        assert_eq!(clock.now_ms(), 1_000_000);

        clock.advance_ms(60_000);
        assert_eq!(clock.now_ms(), 1_060_000);

        let before = clock.now_local();
        clock.advance_ms(3_600_000);
        let after = clock.now_local();
        assert_eq!((after - before).num_hours(), 1);
    }

    #[test]
    fn test_system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
