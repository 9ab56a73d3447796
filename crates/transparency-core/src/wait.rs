//! Bounded readiness polling.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::DriverError;

/// Poll `probe` every `interval` until it yields `Some`, or fail with
/// [`DriverError::Timeout`] once `timeout` has elapsed.
///
/// Transient probe errors (element missing or stale) count as "not ready
/// yet"; anything else is returned immediately.
pub async fn poll_until<T, F, Fut>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<T, DriverError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, DriverError>>,
{
    let start = Instant::now();

    loop {
        match probe().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) if e.is_transient() => trace!("{} not ready: {}", what, e),
            Err(e) => return Err(e),
        }

        if start.elapsed() >= timeout {
            return Err(DriverError::Timeout {
                locator: what.to_string(),
                timeout,
            });
        }

        tokio::time::sleep(interval).await;
    }
}

/// Give script-rendered content time to settle.
pub async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
