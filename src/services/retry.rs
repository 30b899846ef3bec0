//! Bounded exponential backoff for flaky collaborator calls
//!
//! Delay doubles each attempt (`base_delay * 2^attempt`, capped at `max_delay`).
//! A `Retry-After` hint from a rate-limited response replaces the computed delay.
//! Non-retryable errors return immediately; running out of attempts returns
//! [`GenerationError::Exhausted`] wrapping the last error.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::services::providers::GenerationError;

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 = single attempt)
    pub max_retries: usize,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// Delay before retry number `attempt` (0-indexed)
    pub fn calculate_delay(&self, attempt: usize) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(31) as u32);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    fn delay_for(&self, attempt: usize, err: &GenerationError) -> Duration {
        match err {
            GenerationError::RateLimited {
                retry_after: Some(retry_after),
            } => (*retry_after).min(self.max_delay),
            _ => self.calculate_delay(attempt),
        }
    }
}

/// Runs `operation` until it succeeds, fails permanently, or retries run out
pub async fn call_with_retry<F, Fut, T>(
    mut operation: F,
    config: &RetryConfig,
) -> Result<T, GenerationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GenerationError>>,
{
    let mut attempt = 0;

    loop {
        let err = match operation().await {
            Ok(result) => return Ok(result),
            Err(err) => err,
        };

        if !err.is_retryable() {
            return Err(err);
        }

        if attempt >= config.max_retries {
            return Err(GenerationError::Exhausted {
                attempts: attempt + 1,
                last: Box::new(err),
            });
        }

        let delay = config.delay_for(attempt, &err);
        tracing::warn!(
            error = %err,
            attempt = attempt + 1,
            delay_ms = delay.as_millis() as u64,
            "Retrying after transient failure"
        );
        sleep(delay).await;

        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast_config(max_retries: usize) -> RetryConfig {
        RetryConfig::new(max_retries, Duration::from_millis(1), Duration::from_millis(5))
    }

    #[test]
    fn test_calculate_delay_exponential() {
        let config = RetryConfig::new(5, Duration::from_secs(1), Duration::from_secs(60));
        assert_eq!(config.calculate_delay(0), Duration::from_secs(1));
        assert_eq!(config.calculate_delay(1), Duration::from_secs(2));
        assert_eq!(config.calculate_delay(2), Duration::from_secs(4));
        assert_eq!(config.calculate_delay(3), Duration::from_secs(8));
    }

    #[test]
    fn test_calculate_delay_capped() {
        let config = RetryConfig::new(10, Duration::from_secs(1), Duration::from_secs(10));
        assert_eq!(config.calculate_delay(5), Duration::from_secs(10));
        assert_eq!(config.calculate_delay(200), Duration::from_secs(10));
    }

    #[test]
    fn test_retry_after_overrides_backoff() {
        let config = RetryConfig::new(3, Duration::from_secs(1), Duration::from_secs(60));
        let err = GenerationError::RateLimited {
            retry_after: Some(Duration::from_secs(15)),
        };
        assert_eq!(config.delay_for(0, &err), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_succeeds_first_try() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = call_with_retry(
            || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, GenerationError>("ok")
                }
            },
            &fast_config(3),
        )
        .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = call_with_retry(
            || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(GenerationError::RateLimited { retry_after: None })
                    } else {
                        Ok(42)
                    }
                }
            },
            &fast_config(3),
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_after_max_retries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = call_with_retry(
            || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(GenerationError::Timeout)
                }
            },
            &fast_config(2),
        )
        .await;

        assert_eq!(
            result,
            Err(GenerationError::Exhausted {
                attempts: 3,
                last: Box::new(GenerationError::Timeout)
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = call_with_retry(
            || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(GenerationError::Api {
                        status: 401,
                        message: "invalid key".to_string(),
                    })
                }
            },
            &fast_config(5),
        )
        .await;

        assert!(matches!(result, Err(GenerationError::Api { status: 401, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
