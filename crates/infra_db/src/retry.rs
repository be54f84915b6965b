//! Retry policy for transactional operations
//!
//! Lock waits serialize most concurrent writers, but under `FOR UPDATE`
//! ordering two payments against the same account can still deadlock or lose
//! a serialization race. Those transactions roll back cleanly, so the whole
//! operation is retried with exponential backoff.

use backoff::ExponentialBackoffBuilder;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Default cap on the total time spent retrying one operation
const MAX_ELAPSED: Duration = Duration::from_secs(5);

/// Runs `operation` until it succeeds, fails permanently, or the backoff
/// window is exhausted
///
/// Only errors for which `is_transient` returns true are retried; everything
/// else is returned to the caller immediately.
pub async fn with_retries<T, E, F, Fut, P>(
    name: &str,
    is_transient: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(20))
        .with_max_interval(Duration::from_millis(500))
        .with_max_elapsed_time(Some(MAX_ELAPSED))
        .build();

    let is_transient = &is_transient;
    backoff::future::retry(policy, || {
        let attempt = operation();
        async move {
            match attempt.await {
                Ok(value) => Ok(value),
                Err(err) if is_transient(&err) => {
                    warn!(operation = name, error = %err, "retrying after transient conflict");
                    Err(backoff::Error::transient(err))
                }
                Err(err) => Err(backoff::Error::permanent(err)),
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatabaseError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retries_transient_conflicts() {
        let attempts = AtomicU32::new(0);

        let result = with_retries("test", DatabaseError::is_retryable, || async {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(DatabaseError::ConcurrencyConflict("deadlock".into()))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> = with_retries("test", DatabaseError::is_retryable, || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(DatabaseError::NotFound("gone".into()))
        })
        .await;

        assert!(matches!(result, Err(DatabaseError::NotFound(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
