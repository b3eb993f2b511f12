//! Retry strategies.
//!
//! The client never retries on its own; it computes whether another
//! attempt is worthwhile and how long to wait, and the calling loop
//! schedules it.

use rand::Rng;
use std::time::Duration;

/// When and how a failed request may be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStrategy {
    /// Up to `max_attempts` total attempts, doubling `base_delay` for each
    /// one.
    ExponentialBackoff {
        max_attempts: u32,
        base_delay: Duration,
    },
}

impl RetryStrategy {
    /// The delay before the next attempt, or `None` once the attempt
    /// budget is spent. `attempt` is zero-based: the first retry decision
    /// after the initial attempt passes 0.
    ///
    /// The delay is `2^attempt * base_delay` plus one to ten milliseconds
    /// of jitter so synchronized callers spread out. The exponential term
    /// saturates instead of overflowing.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        let Self::ExponentialBackoff {
            max_attempts,
            base_delay,
        } = *self;
        if attempt.saturating_add(1) >= max_attempts {
            return None;
        }
        let backoff = base_delay.saturating_mul(2u32.saturating_pow(attempt));
        let jitter = Duration::from_millis(rand::thread_rng().gen_range(1..=10));
        Some(backoff.saturating_add(jitter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRATEGY: RetryStrategy = RetryStrategy::ExponentialBackoff {
        max_attempts: 3,
        base_delay: Duration::from_millis(100),
    };

    #[test]
    fn first_retry_waits_base_delay_plus_jitter() {
        for _ in 0..100 {
            let delay = STRATEGY.delay(0).unwrap();
            assert!(delay >= Duration::from_millis(101));
            assert!(delay <= Duration::from_millis(110));
        }
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let delay = STRATEGY.delay(1).unwrap();
        assert!(delay >= Duration::from_millis(201));
        assert!(delay <= Duration::from_millis(210));
    }

    #[test]
    fn attempt_budget_is_total_attempts() {
        assert!(STRATEGY.delay(1).is_some());
        assert_eq!(STRATEGY.delay(2), None);
        assert_eq!(STRATEGY.delay(50), None);
    }

    #[test]
    fn zero_attempt_budget_never_retries() {
        let strategy = RetryStrategy::ExponentialBackoff {
            max_attempts: 0,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(strategy.delay(0), None);
    }

    #[test]
    fn huge_attempt_counts_saturate() {
        let strategy = RetryStrategy::ExponentialBackoff {
            max_attempts: u32::MAX,
            base_delay: Duration::from_secs(1),
        };
        assert!(strategy.delay(200).is_some());
    }
}
