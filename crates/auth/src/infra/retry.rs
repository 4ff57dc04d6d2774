//! Bounded Backoff Retry
//!
//! Retries transient store failures at the collaborator boundary. Only
//! errors marked retryable are retried; after the attempt budget is spent
//! the last error surfaces to the caller unchanged.

use std::future::Future;
use std::time::Duration;

use crate::error::AuthResult;

/// Retry budget for store operations
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
        }
    }
}

/// Run a store operation under the given retry budget
pub async fn with_backoff<T, F, Fut>(policy: &BackoffPolicy, mut op: F) -> AuthResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AuthResult<T>>,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "store operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.max_delay);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> BackoffPolicy {
        BackoffPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    fn transient() -> AuthError {
        AuthError::StoreUnavailable {
            retryable: true,
            detail: "connection reset".to_string(),
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = with_backoff(&fast_policy(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(transient())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_budget_exhausted_surfaces_last_error() {
        let calls = AtomicU32::new(0);
        let result: AuthResult<()> = with_backoff(&fast_policy(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(transient()) }
        })
        .await;

        assert!(result.unwrap_err().is_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_not_retried() {
        let calls = AtomicU32::new(0);
        let result: AuthResult<()> = with_backoff(&fast_policy(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AuthError::InvalidCredentials) }
        })
        .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
