//! Serializable breaker configuration and its validation.

use crate::builder::error::ConfigViolation;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Plain-data breaker settings, suitable for embedding in application
/// config files.
///
/// # Example
///
/// ```rust
/// use tripwire::{CircuitBreaker, CircuitBreakerBuilder, CircuitBreakerConfig};
///
/// let config: CircuitBreakerConfig =
///     serde_json::from_str(r#"{ "name": "ledger", "threshold": 3, "cooldown_ms": 5000 }"#)
///         .unwrap();
///
/// let breaker: CircuitBreaker<String> = CircuitBreakerBuilder::from_config(&config)
///     .build()
///     .unwrap();
/// assert_eq!(breaker.name(), Some("ledger"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub threshold: u32,
    pub cooldown_ms: u64,
}

impl CircuitBreakerConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Check every field, accumulating ALL violations.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigViolation>> {
        validate(self.threshold, self.cooldown())
    }
}

/// Range checks shared by the builder and [`CircuitBreakerConfig`].
///
/// Returns `Validation::Success(())` if all checks pass, otherwise a
/// `Validation::Failure` holding every violation found.
pub(crate) fn validate(
    threshold: u32,
    cooldown: Duration,
) -> Validation<(), NonEmptyVec<ConfigViolation>> {
    let threshold_check = if threshold < 1 {
        Validation::fail(ConfigViolation::ThresholdTooLow { threshold })
    } else {
        Validation::success(())
    };

    let cooldown_check = if cooldown < Duration::from_millis(1) {
        Validation::fail(ConfigViolation::CooldownTooShort { cooldown })
    } else {
        Validation::success(())
    };

    Validation::all_vec(vec![threshold_check, cooldown_check]).map(|_| ())
}
