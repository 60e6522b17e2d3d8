//! # Retry Policy
//!
//! A caller-invoked wrapper, deliberately outside the transport: the
//! transport makes exactly one attempt, and only the caller knows whether
//! an operation is idempotent. Retries apply to errors flagged retryable
//! (network, timeout, 5xx) with exponential backoff; auth and validation
//! failures are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::errors::ClientResult;

/// Bounded exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles per attempt
    pub base_backoff: Duration,
    /// Cap on any single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        RetryPolicy {
            max_retries,
            ..Default::default()
        }
    }

    /// Delay before retry number `attempt` (zero-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run an idempotent operation, retrying transient failures up to the
    /// configured bound. The operation is a closure so each attempt
    /// rebuilds and re-signs the request with a fresh timestamp.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay(attempt);
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ClientError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn service_error() -> ClientError {
        ClientError::from_status(503, "/v1/cat", Some("busy".to_string()))
    }

    fn auth_error() -> ClientError {
        ClientError::from_status(401, "/v1/cat", None)
    }

    #[tokio::test]
    async fn test_retries_transient_errors_up_to_bound() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
        };
        let calls = AtomicU32::new(0);
        let result: ClientResult<()> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(service_error()) }
            })
            .await;
        assert!(matches!(result, Err(ClientError::Service { .. })));
        // one initial attempt + two retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
        };
        let calls = AtomicU32::new(0);
        let result = policy
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(service_error())
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_auth_errors_never_retried() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let result: ClientResult<()> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(auth_error()) }
            })
            .await;
        assert!(matches!(result, Err(ClientError::Auth { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(2), Duration::from_millis(400));
        assert_eq!(policy.delay(10), Duration::from_secs(2));
    }
}
