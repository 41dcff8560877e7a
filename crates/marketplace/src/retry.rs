//! Bounded, fixed-delay retry of a single fallible operation.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use common::{Outcome, keys};

use crate::error::RetryExhausted;

/// Attempts made per network call unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Pause between attempts unless configured otherwise.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Wraps one operation with bounded retry and a fixed delay between attempts.
///
/// The policy holds no state across calls, so one value can be shared by any
/// number of concurrent, independent invocations. Exhaustion is reported as a
/// value, never as a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy. `max_attempts` below 1 is treated as 1.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// A policy that retries without pausing.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `f` until it succeeds or the attempts are used up.
    ///
    /// Every `Err` counts as one failed attempt. After the last one the final
    /// error is returned inside [`RetryExhausted`].
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut f: F) -> Result<T, RetryExhausted<E>>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts;
        let mut attempt = 1;

        loop {
            tracing::debug!(operation, attempt, max_attempts, "starting attempt");
            metrics::counter!("marketplace_retry_attempts_total", "operation" => operation.to_string())
                .increment(1);

            let error = match f().await {
                Ok(value) => {
                    tracing::info!(operation, attempt, max_attempts, "attempt succeeded");
                    return Ok(value);
                }
                Err(error) => error,
            };

            tracing::warn!(operation, attempt, max_attempts, error = %error, "attempt failed");

            if attempt >= max_attempts {
                tracing::error!(
                    operation,
                    max_attempts,
                    error = %error,
                    "operation failed permanently"
                );
                metrics::counter!("marketplace_retry_exhausted_total", "operation" => operation.to_string())
                    .increment(1);
                return Err(RetryExhausted {
                    operation: operation.to_string(),
                    attempts: attempt,
                    last_error: error,
                });
            }

            tracing::info!(
                operation,
                attempt,
                max_attempts,
                delay_ms = self.delay.as_millis() as u64,
                "retrying"
            );
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            attempt += 1;
        }
    }

    /// Outcome-level form of [`RetryPolicy::run`].
    ///
    /// A failed outcome counts as a failed attempt. On exhaustion the returned
    /// failure reads "max retries exceeded: <last reason>", keeps the last
    /// attempt's meta and adds `operation` and `attempts`.
    pub async fn execute<F, Fut>(&self, operation: &str, mut f: F) -> Outcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        let result = self
            .run(operation, || {
                let attempt = f();
                async move {
                    let outcome = attempt.await;
                    if outcome.is_success() {
                        Ok(outcome)
                    } else {
                        Err(FailedAttempt(outcome))
                    }
                }
            })
            .await;

        match result {
            Ok(outcome) => outcome,
            Err(exhausted) => Outcome::failure(exhausted.to_string())
                .merge_meta(exhausted.last_error.0.meta().clone())
                .with_meta(keys::OPERATION, exhausted.operation)
                .with_meta(keys::ATTEMPTS, exhausted.attempts),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY)
    }
}

struct FailedAttempt(Outcome);

impl Display for FailedAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.error_message().unwrap_or("operation failed"))
    }
}
