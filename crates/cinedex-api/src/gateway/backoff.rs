//! Retry policy, per-call state machine and the injectable delay function.

use std::time::Duration;

use futures::future::BoxFuture;

use super::error::ApiError;

/// Non-blocking delay used between retry attempts.
///
/// Injected so tests can record backoff delays without real timers.
pub trait Sleeper: Send + Sync {
    /// Suspends the calling flow for `delay`.
    fn sleep(&self, delay: Duration) -> BoxFuture<'_, ()>;
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(delay))
    }
}

/// Exponential backoff without cap or jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(retries: u32, base_delay: Duration) -> Self {
        Self {
            retries,
            base_delay,
        }
    }

    /// Delay before retry `n` (1-indexed): `base_delay * 2^(n-1)`.
    ///
    /// Saturates at `Duration::MAX` instead of overflowing.
    #[must_use]
    pub fn delay_for(&self, n: u32) -> Duration {
        let exp = n.saturating_sub(1);
        let factor = 2u32.checked_pow(exp).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Decides whether to retry after `attempts` failed attempts.
    ///
    /// Returns the backoff delay, or `None` when the failure is terminal.
    #[must_use]
    pub fn next_delay(&self, attempts: u32, err: &ApiError) -> Option<Duration> {
        (attempts <= self.retries && err.is_retryable()).then(|| self.delay_for(attempts))
    }
}

/// Explicit per-call lifecycle driven by [`Gateway::execute`](super::Gateway::execute).
#[derive(Debug)]
pub(crate) enum CallState<T> {
    /// Ready to dispatch attempt `attempt + 1`.
    Pending {
        /// Attempts already made.
        attempt: u32,
    },
    /// Waiting `delay` before the next attempt.
    Retrying {
        /// Attempts already made.
        attempt: u32,
        /// Backoff before the next attempt.
        delay: Duration,
    },
    /// Terminal success.
    Resolved(T),
    /// Terminal failure.
    Failed(ApiError),
}

impl<T> CallState<T> {
    /// Initial state of every call.
    pub(crate) const fn start() -> Self {
        Self::Pending { attempt: 0 }
    }

    /// Transition after an attempt settled.
    pub(crate) fn settle(attempt: u32, result: Result<T, ApiError>, policy: &RetryPolicy) -> Self {
        match result {
            Ok(value) => Self::Resolved(value),
            Err(err) => match policy.next_delay(attempt, &err) {
                Some(delay) => {
                    tracing::warn!(
                        attempt,
                        max_retries = policy.retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "retryable failure; backing off"
                    );
                    Self::Retrying { attempt, delay }
                }
                None => Self::Failed(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::gateway::error::ErrorKind;

    fn policy(retries: u32) -> RetryPolicy {
        RetryPolicy::new(retries, Duration::from_millis(100))
    }

    #[test]
    fn test_delay_doubles() {
        // Arrange
        let p = policy(5);

        // Act & Assert
        assert_eq!(p.delay_for(1), Duration::from_millis(100));
        assert_eq!(p.delay_for(2), Duration::from_millis(200));
        assert_eq!(p.delay_for(3), Duration::from_millis(400));
        assert_eq!(p.delay_for(4), Duration::from_millis(800));
    }

    #[test]
    fn test_delay_saturates_for_huge_attempts() {
        // Arrange
        let p = RetryPolicy::new(u32::MAX, Duration::from_secs(1));

        // Act
        let delay = p.delay_for(200);

        // Assert
        assert!(delay >= Duration::from_secs(u64::from(u32::MAX)));
    }

    #[test]
    fn test_retry_only_within_budget() {
        // Arrange
        let p = policy(2);
        let err = ApiError::from_response(503, "");

        // Act & Assert
        assert_eq!(p.next_delay(1, &err), Some(Duration::from_millis(100)));
        assert_eq!(p.next_delay(2, &err), Some(Duration::from_millis(200)));
        assert_eq!(p.next_delay(3, &err), None);
    }

    #[test]
    fn test_no_retry_for_client_errors() {
        // Arrange
        let p = policy(3);
        let err = ApiError::from_response(404, "");

        // Act & Assert
        assert_eq!(p.next_delay(1, &err), None);
    }

    #[test]
    fn test_no_retry_when_budget_is_zero() {
        // Arrange
        let p = policy(0);
        let err = ApiError::new(ErrorKind::Network, "connection refused");

        // Act & Assert
        assert_eq!(p.next_delay(1, &err), None);
    }

    #[test]
    fn test_settle_transitions() {
        // Arrange
        let p = policy(1);

        // Act
        let ok: CallState<u8> = CallState::settle(1, Ok(7), &p);
        let retry: CallState<u8> = CallState::settle(1, Err(ApiError::from_response(429, "")), &p);
        let failed: CallState<u8> = CallState::settle(2, Err(ApiError::from_response(429, "")), &p);

        // Assert
        assert!(matches!(ok, CallState::Resolved(7)));
        assert!(matches!(
            retry,
            CallState::Retrying { attempt: 1, delay } if delay == Duration::from_millis(100)
        ));
        assert!(matches!(failed, CallState::Failed(e) if e.status() == Some(429)));
    }
}
