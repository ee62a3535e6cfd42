//! Shared retry/backoff policy for remote requests.
//!
//! The crawler and the deletion executor talk to the same rate-limited API;
//! both route every request through [`BackoffPolicy::run`] so retry behavior
//! cannot diverge between the two paths.
//!
//! Rate-limit signals sleep for the server-suggested delay (or a fixed
//! fallback), transient failures back off exponentially with a cap, and
//! permanent failures abort immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::Error;
use crate::remote::ApiError;

/// Default attempt ceiling per operation.
const MAX_ATTEMPTS: u32 = 6;
/// First exponential-backoff sleep.
const BASE_DELAY: Duration = Duration::from_secs(1);
/// Upper bound on a single backoff sleep.
const MAX_DELAY: Duration = Duration::from_secs(60);
/// Sleep used for a rate-limit response without a `Retry-After` hint.
const RATE_LIMIT_FALLBACK: Duration = Duration::from_secs(5);

/// Retry policy for operations against the remote store.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    rate_limit_fallback: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: BASE_DELAY,
            max_delay: MAX_DELAY,
            rate_limit_fallback: RATE_LIMIT_FALLBACK,
        }
    }
}

impl BackoffPolicy {
    /// Create a policy with custom budgets. Tests use millisecond delays.
    ///
    /// `max_attempts` is clamped to at least one attempt.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        rate_limit_fallback: Duration,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            rate_limit_fallback,
        }
    }

    /// Exponential delay for a zero-based attempt number, capped.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Drive `op` to success or a terminal failure.
    ///
    /// `op` is invoked up to the attempt ceiling. Sleeps happen between
    /// attempts only; once the budget is spent the failure is returned
    /// without a trailing sleep. The sleeps suspend the calling task and
    /// never block concurrent readers.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ApiError`] unchanged for permanent failures,
    /// or [`Error::RetryExhausted`] carrying the last observed status once
    /// the attempt ceiling is reached.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut last_status = None;
        for attempt in 0..self.max_attempts {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_transient() {
                return Err(err.into());
            }
            last_status = err.status().or(last_status);

            if attempt + 1 == self.max_attempts {
                break;
            }

            let delay = match &err {
                ApiError::RateLimited { retry_after } => retry_after
                    .map_or(self.rate_limit_fallback, Duration::from_secs),
                _ => self.delay_for_attempt(attempt),
            };
            log::warn!(
                "{operation}: attempt {}/{} failed ({err}), retrying in {delay:?}",
                attempt + 1,
                self.max_attempts,
            );
            tokio::time::sleep(delay).await;
        }

        log::error!("{operation}: retry budget exhausted, last status: {last_status:?}");
        Err(Error::RetryExhausted {
            operation: operation.to_string(),
            last_status,
        })
    }
}
