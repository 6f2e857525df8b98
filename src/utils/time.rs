//! Time utilities

use chrono::{DateTime, Duration, Utc};

/// UTC clock that never hands out the same instant twice
///
/// Replay orders events by timestamp, so two events of one memory must never
/// share a timestamp. When the wall clock has not advanced (or went
/// backwards) since the last reading, the clock returns the previous instant
/// plus one nanosecond.
#[derive(Debug, Clone, Default)]
pub struct MonotonicClock {
    last: Option<DateTime<Utc>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next strictly increasing timestamp
    pub fn now(&mut self) -> DateTime<Utc> {
        let wall = Utc::now();
        let next = match self.last {
            Some(last) if wall <= last => last + Duration::nanoseconds(1),
            _ => wall,
        };
        self.last = Some(next);
        next
    }

    /// Record an externally produced timestamp (used during replay)
    pub fn observe(&mut self, timestamp: DateTime<Utc>) {
        if self.last.map_or(true, |last| timestamp > last) {
            self.last = Some(timestamp);
        }
    }

    pub fn last(&self) -> Option<DateTime<Utc>> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_strictly_increasing() {
        let mut clock = MonotonicClock::new();
        let mut previous = clock.now();
        for _ in 0..1000 {
            let next = clock.now();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_clock_moves_past_observed_future() {
        let mut clock = MonotonicClock::new();
        let future = Utc::now() + Duration::hours(1);
        clock.observe(future);

        assert!(clock.now() > future);
    }

    #[test]
    fn test_observe_ignores_older_timestamps() {
        let mut clock = MonotonicClock::new();
        let now = clock.now();
        clock.observe(now - Duration::seconds(10));

        assert_eq!(clock.last(), Some(now));
    }
}
