//! Core circuit breaker state machine.
//!
//! This module contains the pure part of the breaker:
//! - The three states and their transition hooks
//! - The clock abstraction used for lazy cooldown expiry
//!
//! Nothing here locks, logs or calls user code. The [`crate::breaker`]
//! module is the imperative shell that applies these decisions.

mod clock;
mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use state::{CircuitState, FailureOutcome, StateKind};
