//! Retry logic.
//!
//! # Responsibilities
//! - Determine if a transport failure is retryable
//! - Execute retries with exponential backoff + jitter
//!
//! # Design Decisions
//! - Only transport failures are retried; an HTTP error status is an answer
//! - POST/PUT/PATCH/DELETE are retried only when the connection never opened
//! - Delays grow so a cold-starting host has time to boot
//! - Jittered backoff prevents a burst of clients retrying in lockstep

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use reqwest::Method;

use crate::config::RetryConfig;
use crate::observability::metrics;

/// Bounded retry schedule for transport failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
            max_delay_ms,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay_ms, config.max_delay_ms)
    }

    /// A policy that tries exactly once.
    pub fn no_retries() -> Self {
        Self::new(1, 0, 0)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after `attempt` failed attempts: the base delay doubled
    /// per attempt, capped at the maximum, plus up to 10% jitter.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let Some(exponent) = attempt.checked_sub(1) else {
            return Duration::ZERO;
        };

        let capped = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(exponent))
            .min(self.max_delay_ms);
        let jitter = match capped / 10 {
            0 => 0,
            spread => rand::thread_rng().gen_range(0..spread),
        };
        Duration::from_millis(capped + jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// The error from the final attempt, with the number of attempts made.
#[derive(Debug)]
pub struct RetryFailure<E> {
    pub error: E,
    pub attempts: u32,
}

/// Whether a transport error may succeed if the request is sent again.
///
/// A failed connect never reached the server, so it is retried for every
/// method. Once the request may have been delivered, only safe methods
/// (GET, HEAD, OPTIONS) are sent again.
pub fn is_retryable(method: &Method, err: &reqwest::Error) -> bool {
    if err.is_builder() || err.is_redirect() || err.is_decode() {
        return false;
    }
    if err.is_connect() {
        return true;
    }
    method.is_safe() && (err.is_timeout() || err.is_request())
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are exhausted.
pub async fn with_retries<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    mut op: F,
    retryable: R,
) -> Result<T, RetryFailure<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempts = 0;

    loop {
        attempts += 1;

        match op(attempts).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempts >= policy.max_attempts || !retryable(&error) {
                    return Err(RetryFailure { error, attempts });
                }

                let backoff = policy.delay_after(attempts);
                tracing::warn!(attempt = attempts, delay = ?backoff, error = %error, "Retrying after transport error");
                metrics::record_transport_retry();
                tokio::time::sleep(backoff).await;
            }
        }
    }
}
