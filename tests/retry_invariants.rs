//! Retry Policy Tests
//!
//! The retry wrapper is caller-invoked and bounded: 5xx and transport
//! failures on idempotent calls are retried with backoff, auth failures
//! never are.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use strata_client::{ClientError, ClientResult, RetryPolicy};

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(2),
    }
}

fn unavailable() -> ClientError {
    ClientError::Service {
        status: 503,
        path: "/v1/cat".to_string(),
        message: "overloaded".to_string(),
    }
}

#[tokio::test]
async fn test_503_on_get_retried_up_to_bound() {
    let calls = AtomicU32::new(0);
    let result: ClientResult<()> = fast_policy(4)
        .run(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(unavailable()) }
        })
        .await;

    assert!(matches!(result, Err(ClientError::Service { status: 503, .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 5, "initial attempt + 4 retries");
}

#[tokio::test]
async fn test_eventual_success_stops_retrying() {
    let calls = AtomicU32::new(0);
    let result = fast_policy(5)
        .run(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 3 {
                    Err(unavailable())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_401_never_retried() {
    let calls = AtomicU32::new(0);
    let result: ClientResult<()> = fast_policy(5)
        .run(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ClientError::Auth {
                    status: 401,
                    path: "/v1/cat".to_string(),
                    message: "bad signature".to_string(),
                })
            }
        })
        .await;

    assert!(matches!(result, Err(ClientError::Auth { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_validation_errors_never_retried() {
    let calls = AtomicU32::new(0);
    let result: ClientResult<()> = fast_policy(5)
        .run(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ClientError::Validation {
                    status: 400,
                    path: "/v1/cat".to_string(),
                    message: "bad shape".to_string(),
                })
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_timeouts_are_retryable() {
    let calls = AtomicU32::new(0);
    let result = fast_policy(1)
        .run(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ClientError::Timeout {
                        method: "GET".to_string(),
                        path: "/v1/cat".to_string(),
                    })
                } else {
                    Ok(n)
                }
            }
        })
        .await;
    assert_eq!(result.unwrap(), 1);
}
