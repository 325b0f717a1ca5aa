use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Retry budget and backoff shape.
///
/// `delay` is the wait before the second attempt; each later wait is the
/// previous one multiplied by `backoff_multiplier`.
///
/// ```
/// use fakesense_retry::{delay_schedule, RetryOptions};
/// use std::time::Duration;
///
/// let opts = RetryOptions::default();
/// assert_eq!(opts.max_attempts, 3);
/// assert_eq!(
///     delay_schedule(&opts),
///     vec![Duration::from_millis(1000), Duration::from_millis(2000)]
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryOptions {
    /// Total attempts including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryOptions {
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Failure of a cancellable retry loop.
#[derive(Debug, thiserror::Error)]
pub enum Interrupted<E> {
    /// The token fired before the loop produced a result.
    #[error("operation cancelled")]
    Cancelled,
    /// Every attempt failed; carries the last error verbatim.
    #[error("{0}")]
    Failed(E),
}

impl<E> Interrupted<E> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Cancelled => None,
        }
    }
}

/// Waits the executor performs when every attempt fails, in order.
pub fn delay_schedule(options: &RetryOptions) -> Vec<Duration> {
    let mut delay = options.delay;
    (1..options.attempts())
        .map(|_| {
            let current = delay;
            delay = next_delay(delay, options.backoff_multiplier);
            current
        })
        .collect()
}

/// Run `op` until it succeeds or `options.max_attempts` is reached.
pub async fn with_retry<T, E, F, Fut>(op: F, options: &RetryOptions) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    with_retry_notify(op, options, |_, _| {}).await
}

/// Like [`with_retry`], calling `on_retry(attempt, &error)` before each backoff
/// sleep. `attempt` is the 1-based number of the attempt that just failed.
pub async fn with_retry_notify<T, E, F, Fut, N>(
    mut op: F,
    options: &RetryOptions,
    mut on_retry: N,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    N: FnMut(u32, &E),
{
    let max_attempts = options.attempts();
    let mut delay = options.delay;
    let mut attempt = 1u32;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(attempt, max_attempts, "retry.recovered");
                }
                return Ok(value);
            }
            Err(err) if attempt < max_attempts => {
                on_retry(attempt, &err);
                tracing::debug!(
                    attempt,
                    max_attempts,
                    backoff_ms = delay.as_millis() as u64,
                    "retry.backoff"
                );
                sleep(delay).await;
                delay = next_delay(delay, options.backoff_multiplier);
                attempt += 1;
            }
            Err(err) => {
                tracing::debug!(attempt, max_attempts, "retry.exhausted");
                return Err(err);
            }
        }
    }
}

/// Like [`with_retry_notify`], aborting as soon as `cancel` fires.
///
/// Cancellation is observed both while an attempt is in flight and during
/// backoff sleeps; a token that is already cancelled prevents the first
/// attempt from starting.
pub async fn with_retry_cancellable<T, E, F, Fut, N>(
    op: F,
    options: &RetryOptions,
    on_retry: N,
    cancel: &CancellationToken,
) -> Result<T, Interrupted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    N: FnMut(u32, &E),
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!("retry.cancelled");
            Err(Interrupted::Cancelled)
        }
        res = with_retry_notify(op, options, on_retry) => res.map_err(Interrupted::Failed),
    }
}

fn next_delay(delay: Duration, multiplier: f64) -> Duration {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return delay;
    }
    Duration::try_from_secs_f64(delay.as_secs_f64() * multiplier).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_follows_multiplier() {
        let opts = RetryOptions::default()
            .with_max_attempts(5)
            .with_delay(Duration::from_millis(100))
            .with_backoff_multiplier(3.0);
        assert_eq!(
            delay_schedule(&opts),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(300),
                Duration::from_millis(900),
                Duration::from_millis(2700),
            ]
        );
    }

    #[test]
    fn single_attempt_never_waits() {
        let opts = RetryOptions::default().with_max_attempts(1);
        assert!(delay_schedule(&opts).is_empty());
        let zero = RetryOptions::default().with_max_attempts(0);
        assert!(delay_schedule(&zero).is_empty());
    }

    #[test]
    fn invalid_multiplier_keeps_delay_constant() {
        let d = Duration::from_millis(250);
        assert_eq!(next_delay(d, f64::NAN), d);
        assert_eq!(next_delay(d, -2.0), d);
        assert_eq!(next_delay(d, f64::INFINITY), d);
    }

    #[test]
    fn huge_multiplier_saturates() {
        assert_eq!(next_delay(Duration::from_secs(u64::MAX / 2), 1e6), Duration::MAX);
    }

    #[test]
    fn interrupted_exposes_failure() {
        let failed: Interrupted<&str> = Interrupted::Failed("boom");
        assert!(!failed.is_cancelled());
        assert_eq!(failed.to_string(), "boom");
        assert_eq!(failed.into_failure(), Some("boom"));
        assert!(Interrupted::<&str>::Cancelled.into_failure().is_none());
    }
}
