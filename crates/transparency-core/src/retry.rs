//! Sequential retry of whole attempts.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use transparency_config::RetryConfig;

use crate::error::SearchError;

/// Fixed-delay retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            attempts: config.attempts.max(1),
            delay: config.delay(),
        }
    }
}

impl RetryPolicy {
    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or runs out of attempts. Each attempt fully replaces the previous one.
    pub async fn run<F, Fut, T>(&self, what: &str, mut operation: F) -> Result<T, SearchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SearchError>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() || attempt >= attempts => return Err(e),
                Err(e) => {
                    warn!(
                        "{} failed (attempt {}/{}): {}, retrying in {:?}",
                        what, attempt, attempts, e, self.delay
                    );
                    sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
