//! Retry policy: caller-side retries with exponential backoff.
//!
//! The data source never retries by itself. Callers that want retries wrap
//! the call in [`retry_outcome`], feeding it [`Attempt`]s produced by
//! `NetworkDataSource::attempt_request`.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::domain::Outcome;
use crate::domain::codes::is_transient;

/// One attempt's outcome, tagged with whether it failed transiently.
///
/// The flag is decided from the HTTP status or transport sentinel, not from
/// the descriptor's code (a server `errorCode` may be anything).
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt<T> {
    pub outcome: Outcome<T>,
    pub transient: bool,
}

impl<T> Attempt<T> {
    /// Settled outcome: never retried.
    pub fn settled(outcome: Outcome<T>) -> Self {
        Self {
            outcome,
            transient: false,
        }
    }

    /// Failure carrying the status or sentinel it came from.
    pub fn failed(outcome: Outcome<T>, code: i32) -> Self {
        Self {
            transient: outcome.is_error() && is_transient(code),
            outcome,
        }
    }
}

/// Retry policy for transient failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Base delay for the first retry.
    pub base_delay: Duration,

    /// Backoff multiplier for exponential backoff.
    pub multiplier: f64,

    /// Total attempts including the first one. `0` behaves like `1`.
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// Calculate delay for the next retry based on attempt number.
    ///
    /// # Arguments
    /// * `attempts` - Number of attempts already made (1-indexed).
    ///
    /// delay = base_delay * multiplier^(attempts - 1)
    ///
    /// Example with base_delay=500ms, multiplier=2.0:
    /// - attempt 1 (first failure): 500ms
    /// - attempt 2: 1s
    /// - attempt 3: 2s
    pub fn next_delay(&self, attempts: u32) -> Duration {
        let base_secs = self.base_delay.as_secs_f64();
        let exponent = i32::try_from(attempts.saturating_sub(1)).unwrap_or(i32::MAX);
        let delay_secs = base_secs * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(delay_secs).unwrap_or(Duration::MAX)
    }

    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            multiplier: 2.0,
            max_attempts: 3,
        }
    }
}

/// Run `op` until it stops failing transiently or attempts run out.
///
/// `op` receives the 1-indexed attempt number. Only attempts flagged
/// transient (timeout, no connectivity, 429, 5xx) are retried; the last
/// outcome is returned as-is.
pub async fn retry_outcome<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Outcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let Attempt { outcome, transient } = op(attempt).await;
        if !transient {
            return outcome;
        }
        let code = outcome.error_ref().map(|e| e.code);
        if attempt >= max_attempts {
            warn!(attempt, ?code, "giving up after transient failures");
            return outcome;
        }
        let delay = policy.next_delay(attempt);
        warn!(
            attempt,
            ?code,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "transient failure, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorDescriptor;
    use crate::domain::codes::{PARSE_ERROR, TIMEOUT};
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[test]
    fn default_policy_has_reasonable_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.multiplier, 2.0);
        assert_eq!(policy.max_attempts, 3);
    }

    #[test]
    fn exponential_backoff_increases() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.next_delay(0), Duration::from_millis(500));
        assert_eq!(policy.next_delay(1), Duration::from_millis(500));
        assert_eq!(policy.next_delay(2), Duration::from_secs(1));
        assert_eq!(policy.next_delay(3), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried_until_success() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let outcome = retry_outcome(&RetryPolicy::default(), |attempt| {
            calls.fetch_add(1, Ordering::Relaxed);
            async move {
                if attempt < 3 {
                    Attempt::failed(Outcome::error(ErrorDescriptor::placeholder(TIMEOUT)), TIMEOUT)
                } else {
                    Attempt::settled(Outcome::success(attempt))
                }
            }
        })
        .await;

        assert_eq!(outcome, Outcome::Success(3));
        assert_eq!(calls.load(Ordering::Relaxed), 3);
        // 500ms + 1s of backoff
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let outcome: Outcome<()> = retry_outcome(&RetryPolicy::default(), |_| {
            calls.fetch_add(1, Ordering::Relaxed);
            async { Attempt::failed(Outcome::error(ErrorDescriptor::placeholder(503)), 503) }
        })
        .await;

        assert_eq!(outcome.error_ref().map(|e| e.code), Some(503));
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_errors_and_empty_are_not_retried() {
        let calls = AtomicU32::new(0);
        let outcome: Outcome<()> = retry_outcome(&RetryPolicy::default(), |_| {
            calls.fetch_add(1, Ordering::Relaxed);
            async {
                let outcome = Outcome::error(ErrorDescriptor::placeholder(PARSE_ERROR));
                Attempt::failed(outcome, PARSE_ERROR)
            }
        })
        .await;
        assert!(outcome.is_error());
        assert_eq!(calls.load(Ordering::Relaxed), 1);

        let outcome: Outcome<()> = retry_outcome(&RetryPolicy::default(), |_| async {
            Attempt::failed(Outcome::Empty, 503)
        })
        .await;
        assert!(outcome.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn transience_follows_the_status_not_the_body_code() {
        let calls = AtomicU32::new(0);
        // 400 whose body claims errorCode 500
        let outcome: Outcome<()> = retry_outcome(&RetryPolicy::default(), |_| {
            calls.fetch_add(1, Ordering::Relaxed);
            async { Attempt::failed(Outcome::error(ErrorDescriptor::new(500, "bad")), 400) }
        })
        .await;
        assert_eq!(outcome.error_ref().map(|e| e.code), Some(500));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn attempt_flags_only_transient_errors() {
        let error = || Outcome::<()>::error(ErrorDescriptor::new(1001, "maintenance"));
        assert!(Attempt::failed(error(), 503).transient);
        assert!(Attempt::failed(error(), 429).transient);
        assert!(!Attempt::failed(error(), 404).transient);
        assert!(!Attempt::settled(error()).transient);
        assert!(!Attempt::failed(Outcome::<()>::Empty, 503).transient);
    }
}
