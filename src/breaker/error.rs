//! Errors returned from guarded attempts.

use std::time::Duration;
use thiserror::Error;

/// Rejection produced when an attempt is made while the circuit is open.
///
/// Carries the failure that was last observed by the breaker, which is the
/// failure that caused (or last confirmed) the open state. It is `None` when
/// the circuit was opened manually before anything failed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "Circuit breaker{} open, attempt aborted (retry in {}ms)",
    quoted(.name),
    .remaining.as_millis()
)]
pub struct CircuitOpenError<E> {
    pub name: Option<String>,
    #[source]
    pub last_failure: Option<E>,
    /// Cooldown left at the moment of rejection.
    pub remaining: Duration,
}

fn quoted(name: &Option<String>) -> String {
    name.as_ref().map(|n| format!(" '{n}'")).unwrap_or_default()
}

/// Failure result of [`CircuitBreaker::attempt`](crate::CircuitBreaker::attempt).
///
/// Neither variant is ever raised as a panic: a failing operation and a
/// rejected attempt both come back as values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttemptError<E> {
    /// The operation ran and failed with this error.
    #[error(transparent)]
    Failed(E),
    /// The operation was not run because the circuit is open.
    #[error(transparent)]
    Open(CircuitOpenError<E>),
}

impl<E> AttemptError<E> {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The operation's own error, if it ran.
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Open(_) => None,
        }
    }

    /// The underlying failure for either variant: the operation's error, or
    /// the failure recorded before the circuit rejected this attempt.
    pub fn last_failure(&self) -> Option<&E> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Open(open) => open.last_failure.as_ref(),
        }
    }
}
