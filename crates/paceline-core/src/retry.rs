//! Opt-in retries for callers.
//!
//! The executor issues exactly one attempt per call. Callers that want
//! retries wrap the call with [`retry`]; every attempt goes back through the
//! rate limiter and consumes its own slot.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::{ApiError, NetworkFailure};

/// Delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed {
        delay: Duration,
    },
    /// `base * factor^attempt`, capped at `max`, optionally with +/- 50% jitter.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(500),
            factor: 2.0,
            max: Duration::from_secs(8),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let capped = (base.as_secs_f64() * factor.powi(exponent)).min(max.as_secs_f64());
                let delay = Duration::from_secs_f64(capped.max(0.0));
                if jitter {
                    delay.mul_f64(0.5 + fastrand::f64())
                } else {
                    delay
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub enabled: bool,
    /// Total attempts are `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
    /// Statuses worth another attempt. Never consulted for 401 or 404.
    pub retry_on_status: Vec<u16>,
    pub retry_on_timeout: bool,
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            backoff: Backoff::default(),
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }
}

impl RetryConfig {
    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
            ..Self::default()
        }
    }

    pub fn no_retry() -> Self {
        Self {
            enabled: false,
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Whether `error` is transient under this policy. Validation,
    /// authentication and not-found errors never are.
    pub fn should_retry(&self, error: &ApiError) -> bool {
        if !self.enabled {
            return false;
        }
        match error {
            ApiError::Validation { .. }
            | ApiError::Authentication { .. }
            | ApiError::NotFound { .. } => false,
            ApiError::Api { status, .. } => self.retry_on_status.contains(status),
            ApiError::Network { failure, .. } => match failure {
                NetworkFailure::Timeout => self.retry_on_timeout,
                NetworkFailure::Connect => self.retry_on_connect,
                NetworkFailure::Other => false,
            },
        }
    }
}

/// Runs `operation` until it succeeds, fails permanently, or the retry
/// budget is spent. The last error is returned unchanged.
pub async fn retry<T, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < config.max_retries && config.should_retry(&error) => {
                let delay = config.backoff.delay(attempt);
                debug!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    kind = %error.kind(),
                    "retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
