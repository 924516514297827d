//! The circuit breaker: the imperative shell around [`crate::core`].
//!
//! A single mutex per breaker serializes every read and write of the current
//! state, the consecutive-failure count and the last observed failure, and
//! every listener call. It is held for admission, for recording an outcome,
//! for manual `open`/`close` and for status queries, but never while the
//! protected operation runs.
//!
//! Because the operation runs unlocked, other callers can query or attempt
//! concurrently. In particular, two callers can both be admitted while the
//! breaker is half-open and run their probes side by side; the last outcome
//! recorded wins.

mod error;
mod listeners;
mod snapshot;

pub use error::{AttemptError, CircuitOpenError};
pub use listeners::Listener;
pub(crate) use listeners::Listeners;
pub use snapshot::BreakerSnapshot;

use crate::builder::{BuildError, CircuitBreakerBuilder};
use crate::core::{CircuitState, Clock, FailureOutcome, StateKind};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

struct Inner<E> {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<E>,
}

/// Guard around a fallible operation that stops calling it while it keeps
/// failing.
///
/// `E` is the operation's error type. It must be `Clone` to attempt anything:
/// a failure is returned to the caller and also kept as the breaker's last
/// observed failure. Wrap non-`Clone` errors in `Arc`.
///
/// # Example
///
/// ```rust
/// use tripwire::{AttemptError, CircuitBreaker, CircuitBreakerBuilder};
/// use std::time::Duration;
///
/// let breaker: CircuitBreaker<String> = CircuitBreakerBuilder::new()
///     .threshold(1)
///     .cooldown(Duration::from_secs(30))
///     .build()
///     .unwrap();
///
/// let first = breaker.attempt(|| Err::<u32, _>("connection refused".to_string()));
/// assert!(matches!(first, Err(AttemptError::Failed(_))));
/// assert!(breaker.is_open());
///
/// // Rejected without running the closure.
/// let second = breaker.attempt(|| -> Result<u32, String> { unreachable!() });
/// assert!(second.unwrap_err().is_open());
/// ```
pub struct CircuitBreaker<E> {
    name: Option<String>,
    threshold: u32,
    cooldown: Duration,
    clock: Arc<dyn Clock>,
    listeners: Listeners,
    inner: Mutex<Inner<E>>,
}

impl<E> CircuitBreaker<E> {
    /// Unnamed breaker with the system clock and no listeners.
    pub fn new(threshold: u32, cooldown: Duration) -> Result<Self, BuildError> {
        CircuitBreakerBuilder::new()
            .threshold(threshold)
            .cooldown(cooldown)
            .build()
    }

    /// Assemble a breaker from already validated parts. Starts closed
    /// without firing any listener.
    pub(crate) fn from_parts(
        name: Option<String>,
        threshold: u32,
        cooldown: Duration,
        clock: Arc<dyn Clock>,
        listeners: Listeners,
    ) -> Self {
        Self {
            name,
            threshold,
            cooldown,
            clock,
            listeners,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure: None,
            }),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Consecutive failures counted since the breaker last entered `Closed`.
    pub fn failure_count(&self) -> u32 {
        self.inner.lock().failure_count
    }

    /// Whether the consecutive-failure count has reached the threshold.
    ///
    /// Stays true while open or half-open until the breaker closes again.
    pub fn is_threshold_reached(&self) -> bool {
        self.failure_count() >= self.threshold
    }

    /// Current state, after promoting an expired `Open` to `HalfOpen`.
    ///
    /// The promotion is a real transition: it fires the half-open listener.
    pub fn state(&self) -> StateKind {
        let mut inner = self.inner.lock();
        self.refresh(&mut inner);
        inner.state.kind()
    }

    pub fn is_closed(&self) -> bool {
        self.state() == StateKind::Closed
    }

    pub fn is_open(&self) -> bool {
        self.state() == StateKind::Open
    }

    pub fn is_half_open(&self) -> bool {
        self.state() == StateKind::HalfOpen
    }

    /// Force the breaker open, restarting the cooldown.
    pub fn open(&self) {
        let mut inner = self.inner.lock();
        let next = CircuitState::open_at(self.clock.now(), self.clock.utc_now());
        self.transition(&mut inner, next);
    }

    /// Force the breaker closed, resetting the failure count.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        self.transition(&mut inner, CircuitState::Closed);
    }

    /// Capture a serializable view of the breaker, refreshing it first.
    pub fn snapshot(&self) -> BreakerSnapshot {
        let mut inner = self.inner.lock();
        self.refresh(&mut inner);

        let opened_at = match &inner.state {
            CircuitState::Open { opened_at, .. } => Some(*opened_at),
            CircuitState::Closed | CircuitState::HalfOpen => None,
        };
        let remaining = inner
            .state
            .remaining_cooldown(self.clock.now(), self.cooldown);

        BreakerSnapshot {
            name: self.name.clone(),
            state: inner.state.kind(),
            failure_count: inner.failure_count,
            threshold: self.threshold,
            cooldown_ms: as_millis(self.cooldown),
            opened_at,
            cooldown_remaining_ms: remaining.map(as_millis),
            has_last_failure: inner.last_failure.is_some(),
            captured_at: self.clock.utc_now(),
        }
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    fn refresh(&self, inner: &mut Inner<E>) {
        if let Some(next) = inner.state.refresh(self.clock.now(), self.cooldown) {
            self.transition(inner, next);
        }
    }

    /// Install `next` and fire its listener. Caller holds the lock.
    fn transition(&self, inner: &mut Inner<E>, next: CircuitState) {
        let from = inner.state.kind();
        let to = next.kind();

        if to == StateKind::Closed {
            inner.failure_count = 0;
        }
        inner.state = next;

        match to {
            StateKind::Open => warn!(
                "Circuit breaker '{}' opening from {} ({} consecutive failures)",
                self.label(),
                from,
                inner.failure_count
            ),
            StateKind::HalfOpen => info!(
                "Circuit breaker '{}' transitioning to half-open after {:?} cooldown",
                self.label(),
                self.cooldown
            ),
            StateKind::Closed => info!("Circuit breaker '{}' closing from {}", self.label(), from),
        }

        self.listeners.notify(to);
    }
}

impl<E: Clone> CircuitBreaker<E> {
    /// The failure observed by the most recent attempt.
    ///
    /// `None` once an attempt has been admitted and succeeded. A rejected
    /// attempt leaves the failure that caused the rejection in place.
    pub fn last_failure(&self) -> Option<E> {
        self.inner.lock().last_failure.clone()
    }

    /// Run `operation` if the breaker admits it, and record the outcome.
    ///
    /// Returns `Err(AttemptError::Open)` without calling `operation` when the
    /// circuit is open, and `Err(AttemptError::Failed)` with the operation's
    /// own error when it ran and failed. The operation runs at most once and
    /// without the breaker's lock held; a panic inside it propagates and
    /// records nothing.
    pub fn attempt<T, F>(&self, operation: F) -> Result<T, AttemptError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.admit()?;
        self.settle(operation())
    }

    /// Async form of [`attempt`](Self::attempt).
    ///
    /// The lock is released before the future is created and is not held
    /// across any `.await`. Dropping the returned future mid-flight records
    /// nothing.
    pub async fn attempt_async<T, F, Fut>(&self, operation: F) -> Result<T, AttemptError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.admit()?;
        let outcome = operation().await;
        self.settle(outcome)
    }

    /// Admission half of the attempt protocol.
    ///
    /// Refreshes the state (possibly promoting to half-open), rejects if it
    /// is still open, otherwise clears the last observed failure.
    pub(crate) fn admit(&self) -> Result<(), AttemptError<E>> {
        let mut inner = self.inner.lock();
        self.refresh(&mut inner);

        if !inner.state.admits() {
            let remaining = inner
                .state
                .remaining_cooldown(self.clock.now(), self.cooldown)
                .unwrap_or_default();
            debug!(
                "Circuit breaker '{}' open, rejecting attempt ({:?} cooldown left)",
                self.label(),
                remaining
            );
            return Err(AttemptError::Open(CircuitOpenError {
                name: self.name.clone(),
                last_failure: inner.last_failure.clone(),
                remaining,
            }));
        }

        // Same effect as clearing right after admission, done under the lock.
        inner.last_failure = None;
        Ok(())
    }

    /// Recording half of the attempt protocol.
    pub(crate) fn settle<T>(&self, outcome: Result<T, E>) -> Result<T, AttemptError<E>> {
        let mut inner = self.inner.lock();

        if !inner.state.admits() {
            debug!(
                "Circuit breaker '{}' received an outcome after opening; state unchanged",
                self.label()
            );
        }

        match outcome {
            Ok(value) => {
                if let Some(next) = inner.state.on_success() {
                    self.transition(&mut inner, next);
                }
                Ok(value)
            }
            Err(error) => {
                inner.last_failure = Some(error.clone());
                let FailureOutcome {
                    failure_count,
                    next,
                } = inner.state.on_failure(
                    inner.failure_count,
                    self.threshold,
                    self.clock.now(),
                    self.clock.utc_now(),
                );
                inner.failure_count = failure_count;
                if let Some(next) = next {
                    self.transition(&mut inner, next);
                }
                Err(AttemptError::Failed(error))
            }
        }
    }
}

impl<E> fmt::Debug for CircuitBreaker<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // try_lock: formatting from inside a listener must not deadlock.
        let state = self.inner.try_lock().map(|inner| inner.state.kind());
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("threshold", &self.threshold)
            .field("cooldown", &self.cooldown)
            .field("state", &state)
            .field("listeners", &self.listeners)
            .finish()
    }
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
