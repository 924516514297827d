//! Circuit breaker states and their transition hooks.
//!
//! Every hook is a pure function of the current state and the inputs it is
//! handed (time, counters, configuration). Hooks return the state to move to,
//! if any; installing it and firing listeners is the breaker's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Data-free classification of a [`CircuitState`].
///
/// This is what status queries, snapshots and logs report.
///
/// # Example
///
/// ```rust
/// use tripwire::core::StateKind;
///
/// assert_eq!(StateKind::HalfOpen.name(), "half_open");
/// assert!(StateKind::Open.rejects());
/// assert!(!StateKind::Closed.rejects());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Closed,
    Open,
    HalfOpen,
}

impl StateKind {
    /// Stable lowercase name for display/logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }

    /// Whether attempts are turned away in this state.
    pub fn rejects(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime state of a circuit breaker.
///
/// Only `Open` carries data: the instant it was entered, used for cooldown
/// expiry, and the matching wall-clock time for diagnostics. Both are dropped
/// when the state is replaced.
#[derive(Clone, Debug, PartialEq)]
pub enum CircuitState {
    /// Calls pass through; consecutive failures are counted.
    Closed,
    /// Calls are rejected until the cooldown has elapsed.
    Open {
        entered_at: Instant,
        opened_at: DateTime<Utc>,
    },
    /// A probe call is admitted to decide between closing and reopening.
    HalfOpen,
}

/// Result of reporting a failed call to a state.
#[derive(Clone, Debug, PartialEq)]
pub struct FailureOutcome {
    /// Consecutive-failure count after the failure was recorded.
    pub failure_count: u32,
    /// State to move to, if the failure causes a transition.
    pub next: Option<CircuitState>,
}

impl CircuitState {
    /// Fresh `Open` state entered at the given instants.
    pub fn open_at(entered_at: Instant, opened_at: DateTime<Utc>) -> Self {
        Self::Open {
            entered_at,
            opened_at,
        }
    }

    pub fn kind(&self) -> StateKind {
        match self {
            Self::Closed => StateKind::Closed,
            Self::Open { .. } => StateKind::Open,
            Self::HalfOpen => StateKind::HalfOpen,
        }
    }

    /// Lazy cooldown check.
    ///
    /// Returns `Some(HalfOpen)` for an `Open` state whose cooldown has fully
    /// elapsed at `now`. Every other state refreshes to itself.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tripwire::core::CircuitState;
    /// use chrono::Utc;
    /// use std::time::{Duration, Instant};
    ///
    /// let entered = Instant::now();
    /// let open = CircuitState::open_at(entered, Utc::now());
    /// let cooldown = Duration::from_millis(100);
    ///
    /// assert_eq!(open.refresh(entered + Duration::from_millis(99), cooldown), None);
    /// assert_eq!(
    ///     open.refresh(entered + Duration::from_millis(100), cooldown),
    ///     Some(CircuitState::HalfOpen)
    /// );
    /// ```
    pub fn refresh(&self, now: Instant, cooldown: Duration) -> Option<CircuitState> {
        match self {
            Self::Open { entered_at, .. } if now.saturating_duration_since(*entered_at) >= cooldown => {
                Some(Self::HalfOpen)
            }
            _ => None,
        }
    }

    /// Whether the protected operation may run, assuming the state has been
    /// refreshed first.
    pub fn admits(&self) -> bool {
        !matches!(self, Self::Open { .. })
    }

    /// Cooldown left before an `Open` state becomes eligible for a probe.
    pub fn remaining_cooldown(&self, now: Instant, cooldown: Duration) -> Option<Duration> {
        match self {
            Self::Open { entered_at, .. } => {
                Some(cooldown.saturating_sub(now.saturating_duration_since(*entered_at)))
            }
            _ => None,
        }
    }

    /// Record a successful call.
    ///
    /// A successful probe closes the circuit. Success while `Closed` leaves the
    /// failure count alone; success while `Open` can only come from a call
    /// admitted before the circuit opened and is ignored.
    pub fn on_success(&self) -> Option<CircuitState> {
        match self {
            Self::HalfOpen => Some(Self::Closed),
            Self::Closed | Self::Open { .. } => None,
        }
    }

    /// Record a failed call.
    ///
    /// `Closed` counts the failure and trips once `threshold` is reached.
    /// `HalfOpen` reopens on any failure regardless of the count. `Open`
    /// ignores stragglers.
    pub fn on_failure(
        &self,
        failure_count: u32,
        threshold: u32,
        now: Instant,
        utc_now: DateTime<Utc>,
    ) -> FailureOutcome {
        match self {
            Self::Closed => {
                let failure_count = failure_count.saturating_add(1);
                let next = (failure_count >= threshold).then(|| Self::open_at(now, utc_now));
                FailureOutcome {
                    failure_count,
                    next,
                }
            }
            Self::HalfOpen => FailureOutcome {
                failure_count,
                next: Some(Self::open_at(now, utc_now)),
            },
            Self::Open { .. } => FailureOutcome {
                failure_count,
                next: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_now() -> (CircuitState, Instant) {
        let entered = Instant::now();
        (CircuitState::open_at(entered, Utc::now()), entered)
    }

    #[test]
    fn kind_classifies_each_state() {
        let (open, _) = open_now();
        assert_eq!(CircuitState::Closed.kind(), StateKind::Closed);
        assert_eq!(open.kind(), StateKind::Open);
        assert_eq!(CircuitState::HalfOpen.kind(), StateKind::HalfOpen);
    }

    #[test]
    fn only_open_rejects() {
        let (open, _) = open_now();
        assert!(CircuitState::Closed.admits());
        assert!(CircuitState::HalfOpen.admits());
        assert!(!open.admits());
    }

    #[test]
    fn refresh_promotes_open_once_cooldown_elapsed() {
        let (open, entered) = open_now();
        let cooldown = Duration::from_millis(2000);

        assert_eq!(open.refresh(entered, cooldown), None);
        assert_eq!(open.refresh(entered + Duration::from_millis(1999), cooldown), None);
        assert_eq!(
            open.refresh(entered + Duration::from_millis(2000), cooldown),
            Some(CircuitState::HalfOpen)
        );
    }

    #[test]
    fn refresh_leaves_closed_and_half_open_alone() {
        let later = Instant::now() + Duration::from_secs(60);
        let cooldown = Duration::from_millis(1);
        assert_eq!(CircuitState::Closed.refresh(later, cooldown), None);
        assert_eq!(CircuitState::HalfOpen.refresh(later, cooldown), None);
    }

    #[test]
    fn remaining_cooldown_counts_down_to_zero() {
        let (open, entered) = open_now();
        let cooldown = Duration::from_millis(1000);

        assert_eq!(
            open.remaining_cooldown(entered + Duration::from_millis(400), cooldown),
            Some(Duration::from_millis(600))
        );
        assert_eq!(
            open.remaining_cooldown(entered + Duration::from_millis(5000), cooldown),
            Some(Duration::ZERO)
        );
        assert_eq!(CircuitState::Closed.remaining_cooldown(entered, cooldown), None);
    }

    #[test]
    fn closed_failure_counts_until_threshold() {
        let now = Instant::now();
        let utc = Utc::now();

        let first = CircuitState::Closed.on_failure(0, 3, now, utc);
        assert_eq!(first.failure_count, 1);
        assert_eq!(first.next, None);

        let second = CircuitState::Closed.on_failure(1, 3, now, utc);
        assert_eq!(second.failure_count, 2);
        assert_eq!(second.next, None);

        let third = CircuitState::Closed.on_failure(2, 3, now, utc);
        assert_eq!(third.failure_count, 3);
        assert_eq!(third.next, Some(CircuitState::open_at(now, utc)));
    }

    #[test]
    fn half_open_failure_reopens_regardless_of_threshold() {
        let now = Instant::now();
        let utc = Utc::now();
        let outcome = CircuitState::HalfOpen.on_failure(0, 100, now, utc);

        assert_eq!(outcome.next, Some(CircuitState::open_at(now, utc)));
        assert_eq!(outcome.failure_count, 0);
    }

    #[test]
    fn open_ignores_straggling_outcomes() {
        let (open, entered) = open_now();
        let outcome = open.on_failure(5, 5, entered, Utc::now());

        assert_eq!(outcome.next, None);
        assert_eq!(outcome.failure_count, 5);
        assert_eq!(open.on_success(), None);
    }

    #[test]
    fn success_closes_half_open_only() {
        assert_eq!(CircuitState::HalfOpen.on_success(), Some(CircuitState::Closed));
        assert_eq!(CircuitState::Closed.on_success(), None);
    }

    #[test]
    fn state_kind_serializes_snake_case() {
        let json = serde_json::to_string(&StateKind::HalfOpen).unwrap();
        assert_eq!(json, "\"half_open\"");
        let back: StateKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StateKind::HalfOpen);
    }

    #[test]
    fn state_kind_displays_its_name() {
        assert_eq!(StateKind::Closed.to_string(), "closed");
        assert_eq!(StateKind::Open.to_string(), "open");
    }
}
