//! Startup retry with exponential backoff.
//!
//! Meant for connection establishment, where the dependency may come up a
//! few seconds after the service does. Not for per-operation retries.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Backoff schedule for [`retry_with`]: the delay starts at `first_delay`
/// and doubles after every failed attempt, capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct RetrySettings {
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub first_delay: Duration,
    /// Upper bound for the doubling delay
    pub max_delay: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            first_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Run `operation` until it succeeds or the retry budget is spent.
///
/// The last error is returned unchanged when the budget runs out.
pub async fn retry_with<F, Fut, T, E>(mut operation: F, settings: RetrySettings) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = settings.first_delay;
    let mut failures = 0u32;

    loop {
        match operation().await {
            Ok(value) => {
                if failures > 0 {
                    debug!(retries = failures, "Operation succeeded after retrying");
                }
                return Ok(value);
            }
            Err(e) => {
                failures += 1;
                if failures > settings.max_retries {
                    warn!(attempts = failures, error = %e, "Retry budget spent, giving up");
                    return Err(e);
                }

                debug!(
                    retry = failures,
                    of = settings.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Operation failed, backing off"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(settings.max_delay);
            }
        }
    }
}

/// [`retry_with`] on the default schedule.
pub async fn retry<F, Fut, T, E>(operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_with(operation, RetrySettings::default()).await
}
