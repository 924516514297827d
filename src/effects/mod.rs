//! Guarding Stillwater effects with a circuit breaker.
//!
//! Effects are lazy descriptions of work, which makes them a natural fit for
//! the attempt protocol: the breaker decides admission first and only then
//! runs the effect against its environment.
//!
//! # Example
//!
//! ```rust
//! use tripwire::{CircuitBreaker, CircuitBreakerBuilder};
//! use stillwater::prelude::*;
//!
//! #[derive(Clone)]
//! struct Inventory {
//!     online: bool,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let breaker: CircuitBreaker<String> = CircuitBreakerBuilder::named("inventory")
//!     .threshold(1)
//!     .cooldown_ms(30_000)
//!     .build()
//!     .unwrap();
//!
//! let lookup = from_fn(|env: &Inventory| {
//!     if env.online {
//!         Ok(12)
//!     } else {
//!         Err("inventory offline".to_string())
//!     }
//! });
//!
//! let result = breaker.attempt_effect(lookup, &Inventory { online: false }).await;
//! assert!(result.is_err());
//! assert!(breaker.is_open());
//! # }
//! ```

mod guarded;
