//! Bounded retry with a fixed delay.
//!
//! Only transient HTTP statuses are retried. Transport failures and every other status are
//! handed back to the caller after the first attempt that produces them.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{SupabaseError, SupabaseResult};
use crate::http::RawResponse;

/// Statuses that trigger another attempt: 429, 503 and 504.
pub const TRANSIENT_STATUSES: [u16; 3] = [429, 503, 504];

/// Whether a status is worth another attempt.
pub fn is_transient(status: u16) -> bool {
    TRANSIENT_STATUSES.contains(&status)
}

/// Retry settings applied to every HTTP call.
///
/// `max_retries` is the total number of attempts, the first one included:
///
/// | `max_retries` | attempts made |
/// |---|---|
/// | `0` | none, fails with [`SupabaseError::MaxRetriesExceeded`] |
/// | `1` | exactly one |
/// | `n` | at most `n` |
///
/// Attempts are separated by exactly `retry_interval_ms`; there is no growth and no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_interval_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_interval_ms: 500,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_interval_ms: u64) -> Self {
        Self {
            max_retries,
            retry_interval_ms,
        }
    }

    /// One attempt, never retried.
    pub fn single_attempt() -> Self {
        Self::new(1, 0)
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_retry_interval_ms(mut self, retry_interval_ms: u64) -> Self {
        self.retry_interval_ms = retry_interval_ms;
        self
    }

    /// Total attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

/// Run `attempt` until it yields a non-transient response or the policy runs out.
///
/// `attempt` receives the 1-based attempt number. An `Err` from `attempt` is returned as-is
/// without further attempts.
pub async fn with_retry<F, Fut>(
    policy: &RetryPolicy,
    mut attempt: F,
) -> SupabaseResult<RawResponse>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = SupabaseResult<RawResponse>>,
{
    let max_attempts = policy.max_attempts();
    let mut last_status = None;

    for n in 1..=max_attempts {
        let response = attempt(n).await?;
        if !is_transient(response.status) {
            return Ok(response);
        }

        last_status = Some(response.status);
        if n < max_attempts {
            warn!(
                status = response.status,
                attempt = n,
                max_attempts,
                delay_ms = policy.retry_interval_ms,
                "Transient status, retrying"
            );
            tokio::time::sleep(policy.retry_interval()).await;
        }
    }

    Err(SupabaseError::MaxRetriesExceeded {
        attempts: max_attempts,
        last_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn response(status: u16) -> RawResponse {
        RawResponse::new(status, Default::default(), Vec::new())
    }

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient(429));
        assert!(is_transient(503));
        assert!(is_transient(504));
        assert!(!is_transient(500));
        assert!(!is_transient(502));
        assert!(!is_transient(401));
        assert!(!is_transient(200));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.retry_interval(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&RetryPolicy::new(3, 1), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(response(200)) }
        })
        .await
        .unwrap();
        assert_eq!(result.status, 200);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_then_success() {
        let statuses = [503, 429, 201];
        let calls = AtomicU32::new(0);
        let result = with_retry(&RetryPolicy::new(3, 1), |n| {
            calls.fetch_add(1, Ordering::SeqCst);
            let status = statuses[(n - 1) as usize];
            async move { Ok(response(status)) }
        })
        .await
        .unwrap();
        assert_eq!(result.status, 201);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries() {
        let calls = AtomicU32::new(0);
        let err = with_retry(&RetryPolicy::new(4, 1), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(response(504)) }
        })
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            SupabaseError::MaxRetriesExceeded {
                attempts: 4,
                last_status: Some(504)
            }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_non_transient_failure_is_final() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&RetryPolicy::new(5, 1), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(response(401)) }
        })
        .await
        .unwrap();
        assert_eq!(result.status, 401);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_attempt_policy() {
        let calls = AtomicU32::new(0);
        let err = with_retry(&RetryPolicy::single_attempt(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(response(429)) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, SupabaseError::MaxRetriesExceeded { attempts: 1, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_budget_makes_no_attempt() {
        let calls = AtomicU32::new(0);
        let err = with_retry(&RetryPolicy::new(0, 1), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(response(200)) }
        })
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            SupabaseError::MaxRetriesExceeded {
                attempts: 0,
                last_status: None
            }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let err = with_retry(&RetryPolicy::new(3, 1), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(SupabaseError::invalid_response("connection reset")) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, SupabaseError::InvalidResponse(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_between_attempts() {
        let start = tokio::time::Instant::now();
        let err = with_retry(&RetryPolicy::new(3, 20), |_| async { Ok(response(503)) })
            .await
            .unwrap_err();
        assert!(matches!(err, SupabaseError::MaxRetriesExceeded { attempts: 3, .. }));
        // Two sleeps between three attempts, none after the last.
        assert_eq!(start.elapsed(), Duration::from_millis(40));
    }
}
