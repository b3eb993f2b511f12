//! Per-host circuit breaking.
//!
//! The client records every server error against the host that produced
//! it. Callers consult `should_circuit_break` before dispatching; the
//! breaker itself never blocks a request, it only reports that a host
//! looks unhealthy right now.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// When a host counts as unhealthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitBreakerStrategy {
    /// Unhealthy after `max_errors` server errors whose most recent entry
    /// is younger than `age`.
    HostErrors { max_errors: usize, age: Duration },
}

/// Server-error timestamps per host, oldest first.
pub(crate) struct HostErrorTracker {
    errors: Mutex<HashMap<String, Vec<Instant>>>,
}

impl HostErrorTracker {
    pub(crate) fn new() -> Self {
        Self {
            errors: Mutex::new(HashMap::new()),
        }
    }

    /// Append a server error for `host` at the current instant.
    pub(crate) fn record(&self, host: &str) {
        let mut errors = self.errors.lock().expect("host error log lock poisoned");
        errors.entry(host.to_owned()).or_default().push(Instant::now());
    }

    /// Whether `host` has crossed the strategy's error threshold with its
    /// most recent error still inside the aging window.
    ///
    /// A host at the threshold whose errors have all aged out gets a clean
    /// slate: its whole log is dropped and the answer is false.
    pub(crate) fn should_break(&self, host: &str, strategy: CircuitBreakerStrategy) -> bool {
        let CircuitBreakerStrategy::HostErrors { max_errors, age } = strategy;
        let mut errors = self.errors.lock().expect("host error log lock poisoned");
        let Some(log) = errors.get(host) else {
            return false;
        };
        if log.len() >= max_errors {
            if log.last().is_some_and(|last| last.elapsed() <= age) {
                return true;
            }
            errors.remove(host);
        }
        false
    }
}
