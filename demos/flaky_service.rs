//! Flaky Service
//!
//! This example guards a simulated dependency that fails in bursts.
//!
//! Key concepts:
//! - Opening the circuit after consecutive failures
//! - Fast rejections carrying the failure that opened the circuit
//! - A single probe after the cooldown decides whether to close again
//! - Listeners reacting to state changes
//!
//! Run with: RUST_LOG=debug cargo run --example flaky_service

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tripwire::{AttemptError, CircuitBreaker, CircuitBreakerBuilder};

#[derive(Debug, Clone)]
struct ServiceError(String);

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "service error: {}", self.0)
    }
}

impl std::error::Error for ServiceError {}

// Fails for requests 3 through 8, then recovers.
struct FlakyService {
    requests: AtomicUsize,
}

impl FlakyService {
    fn call(&self) -> Result<String, ServiceError> {
        let n = self.requests.fetch_add(1, Ordering::SeqCst);
        if (3..9).contains(&n) {
            Err(ServiceError(format!("request {n} timed out")))
        } else {
            Ok(format!("response {n}"))
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let transitions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&transitions);

    let breaker: CircuitBreaker<ServiceError> = CircuitBreakerBuilder::named("flaky-service")
        .threshold(3)
        .cooldown(Duration::from_millis(200))
        .state_change_listener(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .expect("valid breaker configuration");

    let service = FlakyService {
        requests: AtomicUsize::new(0),
    };

    println!("=== Flaky Service ===\n");

    for round in 0..20 {
        match breaker.attempt(|| service.call()) {
            Ok(body) => println!("[{round:2}] ok: {body} ({})", breaker.state()),
            Err(AttemptError::Failed(e)) => println!("[{round:2}] failed: {e} ({})", breaker.state()),
            Err(AttemptError::Open(open)) => {
                println!("[{round:2}] rejected: {open}");
                if let Some(cause) = &open.last_failure {
                    println!("       last failure: {cause}");
                }
            }
        }
        thread::sleep(Duration::from_millis(50));
    }

    let snapshot = breaker.snapshot();
    println!("\nFinal state: {}", snapshot.state);
    println!("Failure count: {}", snapshot.failure_count);
    println!("Requests reaching the service: {}", service.requests.load(Ordering::SeqCst));
    println!("State changes observed: {}", transitions.load(Ordering::SeqCst));
}
