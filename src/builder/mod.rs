//! Builder API for constructing circuit breakers.
//!
//! Required settings (threshold, cooldown) are checked for presence first,
//! then range-checked together so that every problem is reported at once.

pub mod config;
pub mod error;

pub use config::CircuitBreakerConfig;
pub use error::{BuildError, ConfigViolation};

use crate::breaker::{CircuitBreaker, Listener, Listeners};
use crate::core::{Clock, StateKind, SystemClock};
use std::sync::Arc;
use std::time::Duration;
use stillwater::validation::Validation;

/// Builder for constructing circuit breakers with a fluent API.
///
/// # Example
///
/// ```rust
/// use tripwire::{CircuitBreaker, CircuitBreakerBuilder};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let transitions = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&transitions);
///
/// let breaker: CircuitBreaker<std::io::ErrorKind> = CircuitBreakerBuilder::named("geocoder")
///     .threshold(5)
///     .cooldown(Duration::from_secs(10))
///     .state_change_listener(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     })
///     .build()
///     .unwrap();
///
/// breaker.open();
/// breaker.close();
/// assert_eq!(transitions.load(Ordering::SeqCst), 2);
/// ```
pub struct CircuitBreakerBuilder {
    name: Option<String>,
    threshold: Option<u32>,
    cooldown: Option<Duration>,
    clock: Option<Arc<dyn Clock>>,
    listeners: Listeners,
}

impl CircuitBreakerBuilder {
    /// Create a builder for an unnamed breaker.
    pub fn new() -> Self {
        Self {
            name: None,
            threshold: None,
            cooldown: None,
            clock: None,
            listeners: Listeners::default(),
        }
    }

    /// Create a builder for a named breaker.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().name(name)
    }

    /// Start from plain-data settings. Validation still happens in `build`.
    pub fn from_config(config: &CircuitBreakerConfig) -> Self {
        let mut builder = Self::new()
            .threshold(config.threshold)
            .cooldown(config.cooldown());
        builder.name = config.name.clone();
        builder
    }

    /// Set a diagnostic label (optional).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the consecutive-failure count that opens the circuit (required).
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Set how long the circuit stays open before admitting a probe (required).
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    /// Set the cooldown in milliseconds (required, alternative to `cooldown`).
    pub fn cooldown_ms(self, millis: u64) -> Self {
        self.cooldown(Duration::from_millis(millis))
    }

    /// Use a custom time source. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Fire `listener` on every transition, whatever the target state.
    ///
    /// Overrides any per-state listener set earlier; per-state listeners set
    /// afterwards override this one for their state.
    pub fn state_change_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.set_all(Arc::new(listener));
        self
    }

    /// Fire `listener` whenever the breaker enters `Closed`.
    pub fn to_closed_state_listener<F>(self, listener: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listener_for(StateKind::Closed, Arc::new(listener))
    }

    /// Fire `listener` whenever the breaker enters `HalfOpen`.
    pub fn to_half_open_state_listener<F>(self, listener: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listener_for(StateKind::HalfOpen, Arc::new(listener))
    }

    /// Fire `listener` whenever the breaker enters `Open`.
    pub fn to_open_state_listener<F>(self, listener: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listener_for(StateKind::Open, Arc::new(listener))
    }

    fn listener_for(mut self, target: StateKind, listener: Listener) -> Self {
        *self.listeners.slot_mut(target) = Some(listener);
        self
    }

    /// Build the breaker.
    ///
    /// Returns an error if a required setting is missing or out of range.
    /// The new breaker starts `Closed`; no listener fires for it.
    pub fn build<E>(self) -> Result<CircuitBreaker<E>, BuildError> {
        let threshold = self.threshold.ok_or(BuildError::MissingThreshold)?;
        let cooldown = self.cooldown.ok_or(BuildError::MissingCooldown)?;

        if let Validation::Failure(violations) = config::validate(threshold, cooldown) {
            return Err(BuildError::InvalidConfig(
                violations.iter().cloned().collect(),
            ));
        }

        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        Ok(CircuitBreaker::from_parts(
            self.name,
            threshold,
            cooldown,
            clock,
            self.listeners,
        ))
    }
}

impl Default for CircuitBreakerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Breaker = CircuitBreaker<String>;

    #[test]
    fn builder_requires_threshold() {
        let result = CircuitBreakerBuilder::new()
            .cooldown_ms(1000)
            .build::<String>();
        assert!(matches!(result, Err(BuildError::MissingThreshold)));
    }

    #[test]
    fn builder_requires_cooldown() {
        let result = CircuitBreakerBuilder::new().threshold(2).build::<String>();
        assert!(matches!(result, Err(BuildError::MissingCooldown)));
    }

    #[test]
    fn builder_reports_all_range_violations() {
        let result = CircuitBreakerBuilder::new()
            .threshold(0)
            .cooldown(Duration::ZERO)
            .build::<String>();

        match result {
            Err(BuildError::InvalidConfig(violations)) => assert_eq!(violations.len(), 2),
            other => panic!("Expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn getters_reflect_settings() {
        let raw: Breaker = CircuitBreakerBuilder::named("foobar")
            .threshold(13)
            .cooldown_ms(1337)
            .build()
            .unwrap();
        assert_eq!(raw.name(), Some("foobar"));
        assert_eq!(raw.threshold(), 13);
        assert_eq!(raw.cooldown(), Duration::from_millis(1337));

        let structured: Breaker = CircuitBreakerBuilder::named("foobar")
            .threshold(13)
            .cooldown(Duration::from_millis(1337))
            .build()
            .unwrap();
        assert_eq!(structured.cooldown(), raw.cooldown());
    }

    #[test]
    fn unnamed_by_default() {
        let breaker: Breaker = CircuitBreakerBuilder::new()
            .threshold(1)
            .cooldown_ms(1)
            .build()
            .unwrap();
        assert_eq!(breaker.name(), None);
    }

    #[test]
    fn from_config_carries_every_field() {
        let config = CircuitBreakerConfig {
            name: Some("ledger".to_string()),
            threshold: 4,
            cooldown_ms: 250,
        };
        let breaker: Breaker = CircuitBreakerBuilder::from_config(&config).build().unwrap();

        assert_eq!(breaker.name(), Some("ledger"));
        assert_eq!(breaker.threshold(), 4);
        assert_eq!(breaker.cooldown(), Duration::from_millis(250));
    }

    #[test]
    fn from_config_still_validates() {
        let config = CircuitBreakerConfig {
            name: None,
            threshold: 0,
            cooldown_ms: 10,
        };
        let result = CircuitBreakerBuilder::from_config(&config).build::<String>();
        assert!(matches!(result, Err(BuildError::InvalidConfig(_))));
    }

    #[test]
    fn specific_listener_overrides_state_change_listener() {
        let general = Arc::new(AtomicUsize::new(0));
        let opens = Arc::new(AtomicUsize::new(0));
        let general_counter = Arc::clone(&general);
        let open_counter = Arc::clone(&opens);

        let breaker: Breaker = CircuitBreakerBuilder::new()
            .threshold(1)
            .cooldown_ms(1000)
            .state_change_listener(move || {
                general_counter.fetch_add(1, Ordering::SeqCst);
            })
            .to_open_state_listener(move || {
                open_counter.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        breaker.open();
        breaker.close();

        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert_eq!(general.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn construction_fires_no_listener() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);

        let breaker: Breaker = CircuitBreakerBuilder::new()
            .threshold(1)
            .cooldown_ms(1000)
            .state_change_listener(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        assert!(breaker.is_closed());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
