//! Bounded retries with exponential backoff for sidecar calls.
//!
//! Only idempotent calls go through [`retry_while`]; a publish is sent once.
//!
//! # Example
//!
//! ```rust
//! use order_gateway_sidecar::retry::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(3, Duration::from_millis(100));
//!
//! assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
//! assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry policy for idempotent sidecar calls.
///
/// # Default Values
///
/// - `max_retries`: 2
/// - `initial_delay`: 100ms
/// - `max_delay`: 2 seconds
/// - `multiplier`: 2.0
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one
    pub max_retries: usize,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Cap on the delay between retries
    pub max_delay: Duration,
    /// Backoff multiplier
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy with `max_retries` retries starting at `initial_delay`.
    #[must_use]
    pub fn new(max_retries: usize, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            ..Self::default()
        }
    }

    /// Policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `attempt` (zero-based), capped at `max_delay`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return self.initial_delay.min(self.max_delay);
        }

        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);

        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }
}

/// Run `call` until `should_retry` rejects its outcome or the policy is spent.
///
/// The predicate sees the whole outcome, so a successful reply carrying a 5xx
/// status can be retried just like a transport error. The last outcome is
/// returned as-is.
pub async fn retry_while<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&Result<T, E>) -> bool,
{
    let mut attempt = 0;

    loop {
        let outcome = call().await;

        if !should_retry(&outcome) {
            if attempt > 0 {
                tracing::info!(operation, attempt, "Sidecar call settled after retry");
            }
            return outcome;
        }

        if attempt >= policy.max_retries {
            tracing::error!(
                operation,
                attempts = attempt + 1,
                "Sidecar call still failing after max retries"
            );
            return outcome;
        }

        let delay = policy.delay_for_attempt(attempt);
        tracing::warn!(
            operation,
            attempt,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Sidecar call failed, retrying"
        );

        sleep(delay).await;
        attempt += 1;
    }
}
