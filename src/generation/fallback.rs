//! Ordered Fallback
//!
//! Runs a list of async attempts one after another, each raced against a
//! timer. The first attempt to succeed wins; failures and timeouts are logged
//! and skipped. A timed-out attempt is dropped where it stands, so nothing it
//! would have done after the deadline ever happens.

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use tracing::warn;

use crate::error::{PlaceholderError, Result};

/// One labelled attempt.
pub struct Attempt<'a, T> {
    label: String,
    future: BoxFuture<'a, Result<T>>,
}

impl<'a, T> Attempt<'a, T> {
    pub fn new(label: impl Into<String>, future: impl Future<Output = Result<T>> + Send + 'a) -> Self {
        Self {
            label: label.into(),
            future: Box::pin(future),
        }
    }
}

/// The winning attempt's label and value.
#[derive(Debug, Clone, PartialEq)]
pub struct Success<T> {
    pub label: String,
    pub value: T,
}

/// Tries each attempt in order until one succeeds within `timeout`.
///
/// Returns `AllProvidersExhausted` when none does.
pub async fn first_success<T>(attempts: Vec<Attempt<'_, T>>, timeout: Duration) -> Result<Success<T>> {
    let attempted = attempts.len();

    for Attempt { label, future } in attempts {
        let failure = match tokio::time::timeout(timeout, future).await {
            Ok(Ok(value)) => return Ok(Success { label, value }),
            Ok(Err(e)) => e,
            Err(_) => PlaceholderError::Timeout {
                target: label.clone(),
                timeout_ms: timeout.as_millis() as u64,
            },
        };
        warn!("Placeholder service '{}' failed, trying next: {}", label, failure);
    }

    Err(PlaceholderError::AllProvidersExhausted { attempted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn fails(label: &str) -> Attempt<'static, &'static str> {
        let target = label.to_string();
        Attempt::new(label, async move {
            Err(PlaceholderError::ServiceUnavailable {
                target,
                reason: "HTTP 500".to_string(),
            })
        })
    }

    fn succeeds_after(label: &str, delay: Duration, value: &'static str) -> Attempt<'static, &'static str> {
        Attempt::new(label, async move {
            tokio::time::sleep(delay).await;
            Ok(value)
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_wins() {
        let attempts = vec![
            fails("a"),
            succeeds_after("b", Duration::from_millis(10), "from-b"),
            succeeds_after("c", Duration::ZERO, "from-c"),
        ];

        let success = first_success(attempts, Duration::from_secs(5)).await.unwrap();
        assert_eq!(success.label, "b");
        assert_eq!(success.value, "from-b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_moves_to_next() {
        let attempts = vec![
            succeeds_after("slow", Duration::from_secs(10), "late"),
            succeeds_after("fast", Duration::from_millis(5), "on-time"),
        ];

        let success = first_success(attempts, Duration::from_secs(5)).await.unwrap();
        assert_eq!(success.label, "fast");
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failing_is_exhausted() {
        let attempts = vec![
            fails("a"),
            succeeds_after("slow", Duration::from_secs(60), "late"),
            fails("c"),
        ];

        let result = first_success(attempts, Duration::from_secs(1)).await;
        assert!(matches!(
            result,
            Err(PlaceholderError::AllProvidersExhausted { attempted: 3 })
        ));
    }

    #[tokio::test]
    async fn test_no_attempts_is_exhausted() {
        let result = first_success::<()>(Vec::new(), Duration::from_secs(1)).await;
        assert!(matches!(
            result,
            Err(PlaceholderError::AllProvidersExhausted { attempted: 0 })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_success_is_discarded() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let attempts = vec![Attempt::new("slow", async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })];

        let result = first_success(attempts, Duration::from_secs(5)).await;
        assert!(result.is_err());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(!finished.load(Ordering::SeqCst), "timed-out attempt kept running");
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_time_bounded_by_attempts() {
        let start = tokio::time::Instant::now();
        let attempts = vec![
            succeeds_after("a", Duration::from_secs(60), "x"),
            succeeds_after("b", Duration::from_secs(60), "y"),
        ];

        let _ = first_success(attempts, Duration::from_secs(5)).await;
        assert!(start.elapsed() <= Duration::from_secs(10) + Duration::from_millis(50));
    }
}
