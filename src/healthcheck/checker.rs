use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

/// Liveness checker for one running service
#[async_trait]
pub trait LivenessChecker: Send + Sync {
    /// Check if the service answers its liveness probe
    async fn check(&self) -> Result<bool>;

    /// Per-attempt timeout
    fn timeout(&self) -> Duration;
}

/// Upper bound for the delay between two attempts.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Delay before the attempt after one that waited `current`.
pub(crate) fn next_delay(current: Duration) -> Duration {
    std::cmp::min(current.saturating_mul(2), MAX_RETRY_DELAY)
}

/// Check liveness with retry logic using exponential backoff.
/// Starts with `interval` and doubles each retry up to [`MAX_RETRY_DELAY`].
pub async fn check_with_retry<C: LivenessChecker + ?Sized>(
    checker: &C,
    max_retries: usize,
    interval: Duration,
) -> bool {
    let mut current_delay = std::cmp::min(interval, MAX_RETRY_DELAY);

    for attempt in 0..max_retries {
        match checker.check().await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => tracing::debug!("Liveness check attempt {} failed: {}", attempt + 1, e),
        }

        // Don't sleep after the last attempt
        if attempt + 1 < max_retries {
            sleep(current_delay).await;
            current_delay = next_delay(current_delay);
        }
    }
    false
}
