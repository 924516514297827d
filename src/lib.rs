//! Tripwire: a circuit breaker for fallible operations
//!
//! Tripwire follows Stillwater's "pure core, imperative shell" philosophy.
//! The state machine deciding when to reject calls is a set of pure functions
//! over a small enum, while the breaker wraps it in a lock, calls listeners
//! and runs the protected operation.
//!
//! # Core Concepts
//!
//! - **Closed**: calls pass through; consecutive failures are counted
//! - **Open**: the failure threshold was reached; calls are rejected without
//!   running for the cooldown period
//! - **Half-Open**: the cooldown elapsed; the next call is a probe that either
//!   closes the circuit or reopens it
//!
//! The Open to Half-Open move is lazy: there are no timers. It happens the
//! next time anyone attempts a call or asks for the breaker's state.
//!
//! # Example
//!
//! ```rust
//! use tripwire::{AttemptError, CircuitBreaker, CircuitBreakerBuilder, ManualClock};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let breaker: CircuitBreaker<String> = CircuitBreakerBuilder::named("pricing")
//!     .threshold(2)
//!     .cooldown(Duration::from_millis(2000))
//!     .clock(clock.clone())
//!     .build()
//!     .unwrap();
//!
//! for _ in 0..2 {
//!     let _ = breaker.attempt(|| Err::<u32, _>("timeout".to_string()));
//! }
//! assert!(breaker.is_open());
//!
//! match breaker.attempt(|| Ok::<u32, String>(1)) {
//!     Err(AttemptError::Open(open)) => {
//!         assert_eq!(open.last_failure.as_deref(), Some("timeout"));
//!     }
//!     other => panic!("expected rejection, got {other:?}"),
//! }
//!
//! clock.advance(Duration::from_millis(2100));
//! assert!(breaker.is_half_open());
//!
//! assert_eq!(breaker.attempt(|| Ok::<u32, String>(7)), Ok(7));
//! assert!(breaker.is_closed());
//! ```

pub mod breaker;
pub mod builder;
pub mod core;
pub mod effects;

// Re-export commonly used types
pub use breaker::{AttemptError, BreakerSnapshot, CircuitBreaker, CircuitOpenError, Listener};
pub use builder::{BuildError, CircuitBreakerBuilder, CircuitBreakerConfig, ConfigViolation};
pub use core::{Clock, ManualClock, StateKind, SystemClock};
