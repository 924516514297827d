//! Build errors for circuit breaker construction.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when building a circuit breaker.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("Failure threshold not specified. Call .threshold(n) before .build()")]
    MissingThreshold,

    #[error("Cooldown not specified. Call .cooldown(duration) or .cooldown_ms(ms) before .build()")]
    MissingCooldown,

    #[error("Invalid circuit breaker configuration: {}", describe(.0))]
    InvalidConfig(Vec<ConfigViolation>),
}

impl BuildError {
    /// Every violation reported, empty for the `Missing*` variants.
    pub fn violations(&self) -> &[ConfigViolation] {
        match self {
            Self::InvalidConfig(violations) => violations,
            Self::MissingThreshold | Self::MissingCooldown => &[],
        }
    }
}

/// A single out-of-range configuration value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("failure threshold should be greater than 0 (got {threshold})")]
    ThresholdTooLow { threshold: u32 },

    #[error("cooldown should be at least 1ms (got {cooldown:?})")]
    CooldownTooShort { cooldown: Duration },
}

fn describe(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
