// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded, cancellable polling with backoff.
//!
//! Every "wait until the cluster caught up" step in kubekit goes through
//! [`RetryPolicy::poll`]: confirming a delete, waiting for a pod to reach
//! `Running`, and so on.

use crate::error::{KubekitError, Result};
use rand::Rng;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on the number of checks, the first one included
    pub max_attempts: u32,
    pub initial_interval: Duration,
    /// Cap for the growing delay
    pub max_interval: Duration,
    /// Growth factor between consecutive delays (1 = fixed delay)
    pub multiplier: u32,
    /// Add up to 50% random extra delay
    pub jitter: bool,
    /// Total time budget, independent of the attempt count
    pub deadline: Option<Duration>,
}

impl RetryPolicy {
    /// Fixed number of attempts separated by a fixed delay
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            initial_interval: interval,
            max_interval: interval,
            multiplier: 1,
            jitter: false,
            deadline: None,
        }
    }

    /// Doubling delay starting at `initial`, capped at `max`
    pub fn exponential(max_attempts: u32, initial: Duration, max: Duration) -> Self {
        Self {
            max_attempts,
            initial_interval: initial,
            max_interval: max.max(initial),
            multiplier: 2,
            jitter: false,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt.saturating_sub(1));
        let base = self
            .initial_interval
            .saturating_mul(factor)
            .min(self.max_interval);

        if self.jitter && !base.is_zero() {
            let half = (base.as_millis() / 2) as u64;
            base + Duration::from_millis(rand::thread_rng().gen_range(0..=half))
        } else {
            base
        }
    }

    /// Run `check` until it yields `Some(value)`.
    ///
    /// The first check runs immediately. `Ok(None)` means "not yet" and
    /// schedules another attempt. Transient errors (see
    /// [`KubekitError::is_retryable`]) are logged and retried; any other
    /// error aborts the poll.
    pub async fn poll<T, F, Fut>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        mut check: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let attempts = self.max_attempts.max(1);
        let start = Instant::now();

        for attempt in 1..=attempts {
            if cancel.is_cancelled() {
                return Err(KubekitError::Cancelled(operation.to_string()));
            }

            match check().await {
                Ok(Some(value)) => {
                    debug!("{} completed after {} attempt(s)", operation, attempt);
                    return Ok(value);
                }
                Ok(None) => {
                    debug!("{} not complete yet (attempt {}/{})", operation, attempt, attempts);
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        "{} failed with a transient error (attempt {}/{}): {}",
                        operation, attempt, attempts, e
                    );
                }
                Err(e) => return Err(e),
            }

            if attempt == attempts {
                break;
            }

            let mut delay = self.delay_for(attempt);
            if let Some(deadline) = self.deadline {
                let elapsed = start.elapsed();
                if elapsed >= deadline {
                    return Err(KubekitError::Timeout {
                        operation: operation.to_string(),
                        elapsed,
                    });
                }
                delay = delay.min(deadline - elapsed);
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(KubekitError::Cancelled(operation.to_string()));
                }
                _ = sleep(delay) => {}
            }
        }

        Err(KubekitError::RetriesExhausted {
            operation: operation.to_string(),
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn quick(attempts: u32) -> RetryPolicy {
        RetryPolicy::fixed(attempts, Duration::from_millis(1))
    }

    fn api_error(code: u16) -> KubekitError {
        KubekitError::KubeError(kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "boom".to_string(),
            reason: "Test".to_string(),
            code,
        }))
    }

    #[test]
    fn test_fixed_delay_is_constant() {
        let policy = RetryPolicy::fixed(5, Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(4), Duration::from_secs(2));
    }

    #[test]
    fn test_exponential_delay_is_capped() {
        let policy = RetryPolicy::exponential(10, Duration::from_secs(1), Duration::from_secs(10));
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(4), Duration::from_secs(8));
        assert_eq!(policy.delay_for(5), Duration::from_secs(10));
        assert_eq!(policy.delay_for(40), Duration::from_secs(10));
    }

    #[test]
    fn test_jitter_stays_within_half() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(100)).with_jitter();
        for _ in 0..50 {
            let delay = policy.delay_for(1);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(150));
        }
    }

    #[tokio::test]
    async fn test_poll_returns_value_when_ready() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result = quick(5)
            .poll("test", &CancellationToken::new(), || {
                let c = c.clone();
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst);
                    Ok(if n >= 2 { Some(n) } else { None })
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_poll_exhausts_attempts() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result: Result<()> = quick(3)
            .poll("never done", &CancellationToken::new(), || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                }
            })
            .await;

        assert!(matches!(
            result,
            Err(KubekitError::RetriesExhausted { attempts: 3, .. })
        ));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_poll_retries_transient_errors() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result = quick(5)
            .poll("flaky", &CancellationToken::new(), || {
                let c = c.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(api_error(503))
                    } else {
                        Ok(Some("ok"))
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_poll_aborts_on_permanent_error() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result: Result<()> = quick(5)
            .poll("forbidden", &CancellationToken::new(), || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(api_error(403))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_poll_honours_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: Result<()> = quick(5)
            .poll("cancelled", &cancel, || async { Ok(None) })
            .await;

        assert!(matches!(result, Err(KubekitError::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_poll_cancelled_while_sleeping() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let policy = RetryPolicy::fixed(5, Duration::from_secs(30));

        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result: Result<()> = policy.poll("slow", &cancel, || async { Ok(None) }).await;
        assert!(matches!(result, Err(KubekitError::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_poll_times_out_at_deadline() {
        let policy = RetryPolicy::fixed(u32::MAX, Duration::from_millis(5))
            .with_deadline(Duration::from_millis(30));

        let result: Result<()> = policy
            .poll("deadline", &CancellationToken::new(), || async { Ok(None) })
            .await;

        assert!(matches!(result, Err(KubekitError::Timeout { .. })));
    }
}
