//! Time sources for cooldown tracking.
//!
//! The breaker never spawns timers. Cooldown expiry is computed lazily from
//! whatever [`Clock`] the breaker was built with, which makes the time source
//! the only thing a test has to control.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of "now" for a circuit breaker.
///
/// `now` drives cooldown arithmetic and must be monotonic. `utc_now` is only
/// used for diagnostic timestamps in snapshots.
pub trait Clock: Send + Sync {
    /// Monotonic instant used for cooldown expiry.
    fn now(&self) -> Instant;

    /// Wall-clock time for diagnostics.
    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock backed by [`Instant::now`] and [`Utc::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same offset, so a test can hand one clone to the breaker
/// and keep another to advance time.
///
/// # Example
///
/// ```rust
/// use tripwire::core::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// let before = clock.now();
///
/// handle.advance(Duration::from_millis(250));
///
/// assert_eq!(clock.now() - before, Duration::from_millis(250));
/// ```
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: DateTime<Utc>,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Largest offset the clock can be advanced to, roughly a century.
    pub const MAX_OFFSET: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

    /// Create a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            wall_origin: Utc::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Move time forward for every clone of this clock.
    ///
    /// The total offset is capped at [`ManualClock::MAX_OFFSET`].
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock();
        *offset = offset.saturating_add(by).min(Self::MAX_OFFSET);
    }

    /// Total time advanced since creation.
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let elapsed = self.elapsed();
        self.origin.checked_add(elapsed).unwrap_or(self.origin)
    }

    fn utc_now(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.elapsed())
            .ok()
            .and_then(|offset| self.wall_origin.checked_add_signed(offset))
            .unwrap_or(self.wall_origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_frozen_until_advanced() {
        let clock = ManualClock::new();
        let first = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(clock.now(), first);
    }

    #[test]
    fn clones_share_the_offset() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let start = clock.now();

        handle.advance(Duration::from_secs(2));
        handle.advance(Duration::from_millis(100));

        assert_eq!(clock.now() - start, Duration::from_millis(2100));
        assert_eq!(clock.elapsed(), Duration::from_millis(2100));
    }

    #[test]
    fn huge_advance_is_capped() {
        let clock = ManualClock::new();
        let start = clock.now();

        clock.advance(Duration::MAX);
        clock.advance(Duration::from_secs(1));

        assert_eq!(clock.elapsed(), ManualClock::MAX_OFFSET);
        assert_eq!(clock.now() - start, ManualClock::MAX_OFFSET);
        assert!(clock.utc_now() > Utc::now());
    }

    #[test]
    fn wall_clock_follows_offset() {
        let clock = ManualClock::new();
        let before = clock.utc_now();

        clock.advance(Duration::from_secs(3));

        let after = clock.utc_now();
        assert_eq!((after - before).num_seconds(), 3);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
