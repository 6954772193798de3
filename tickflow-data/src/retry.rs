use crate::error::DataError;
use std::{future::Future, time::Duration};
use tracing::warn;

/// Bounded fixed-delay retry for single remote calls.
///
/// The delay is deliberately fixed rather than exponential: exchange throttle
/// windows reset on short fixed intervals, so a longer wait buys nothing. A
/// rate-limit signal waits the longer `rate_limit_cooldown` instead of `delay`
/// before re-issuing the same request; both kinds of wait consume one attempt
/// from the budget.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub rate_limit_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(10),
            rate_limit_cooldown: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            ..Self::default()
        }
    }

    pub fn with_rate_limit_cooldown(self, rate_limit_cooldown: Duration) -> Self {
        Self {
            rate_limit_cooldown,
            ..self
        }
    }

    /// Invoke `operation` until it succeeds, fails fatally, or the attempt
    /// budget is consumed.
    ///
    /// Transient failures are retried after the applicable wait; non-transient
    /// failures abort immediately without consuming further attempts. Each
    /// retry is logged with the attempt index and cause.
    pub async fn execute<T, F, Fut>(
        &self,
        label: &'static str,
        mut operation: F,
    ) -> Result<T, DataError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DataError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut last = String::new();

        for attempt in 1..=max_attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_transient() => {
                    let wait = if error.is_rate_limit() {
                        self.rate_limit_cooldown
                    } else {
                        self.delay
                    };
                    warn!(
                        label,
                        attempt,
                        max_attempts,
                        wait_secs = wait.as_secs(),
                        %error,
                        "transient failure, will retry same request"
                    );
                    last = error.to_string();

                    // No point sleeping once the budget is spent.
                    if attempt < max_attempts {
                        tokio::time::sleep(wait).await;
                    }
                }
                Err(error) => return Err(error),
            }
        }

        Err(DataError::RetriesExhausted {
            attempts: max_attempts,
            last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
            .with_rate_limit_cooldown(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_transient_failures_then_success() {
        let mut invocations = 0u32;

        let actual = fast_policy(5)
            .execute("klines", || {
                invocations += 1;
                let outcome: Result<u32, DataError> = if invocations <= 2 {
                    Err(DataError::Timeout("read timed out".to_string()))
                } else {
                    Ok(42)
                };
                async move { outcome }
            })
            .await;

        assert_eq!(actual, Ok(42));
        assert_eq!(invocations, 3, "operation must run exactly k+1 times");
    }

    #[tokio::test]
    async fn test_budget_exhaustion_after_exactly_max_attempts() {
        let mut invocations = 0u32;

        let actual = fast_policy(3)
            .execute("klines", || {
                invocations += 1;
                async move {
                    Err::<u32, DataError>(DataError::Transport("connection reset".to_string()))
                }
            })
            .await;

        assert_eq!(invocations, 3);
        match actual {
            Err(DataError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(last.contains("connection reset"));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fatal_failure_aborts_without_retry() {
        let mut invocations = 0u32;

        let actual = fast_policy(5)
            .execute("order_book", || {
                invocations += 1;
                async move {
                    Err::<u32, DataError>(DataError::Rejected("invalid symbol".to_string()))
                }
            })
            .await;

        assert_eq!(invocations, 1, "fatal failures must not be retried");
        assert_eq!(
            actual,
            Err(DataError::Rejected("invalid symbol".to_string()))
        );
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried_within_budget() {
        let mut invocations = 0u32;

        let actual = fast_policy(2)
            .execute("klines", || {
                invocations += 1;
                let outcome: Result<u32, DataError> = if invocations == 1 {
                    Err(DataError::RateLimited("429".to_string()))
                } else {
                    Ok(7)
                };
                async move { outcome }
            })
            .await;

        assert_eq!(actual, Ok(7));
        assert_eq!(invocations, 2);
    }

    #[tokio::test]
    async fn test_zero_attempt_budget_still_runs_once() {
        let mut invocations = 0u32;

        let actual = fast_policy(0)
            .execute("klines", || {
                invocations += 1;
                async move { Ok::<u32, DataError>(1) }
            })
            .await;

        assert_eq!(actual, Ok(1));
        assert_eq!(invocations, 1);
    }
}
