//! Serializable point-in-time view of a breaker.

use crate::core::StateKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Diagnostic snapshot of a [`CircuitBreaker`](crate::CircuitBreaker).
///
/// Produced by [`CircuitBreaker::snapshot`](crate::CircuitBreaker::snapshot),
/// which refreshes the state first like every other status query. There is
/// no way to restore a breaker from a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BreakerSnapshot {
    pub name: Option<String>,
    pub state: StateKind,
    pub failure_count: u32,
    pub threshold: u32,
    pub cooldown_ms: u64,
    /// When the circuit last opened, if it is open now.
    pub opened_at: Option<DateTime<Utc>>,
    /// Cooldown left before a probe is admitted, if it is open now.
    pub cooldown_remaining_ms: Option<u64>,
    pub has_last_failure: bool,
    pub captured_at: DateTime<Utc>,
}

impl BreakerSnapshot {
    /// Whether the snapshot was taken while attempts were being rejected.
    pub fn is_rejecting(&self) -> bool {
        self.state.rejects()
    }
}
