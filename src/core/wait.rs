//! Bounded polling for readiness checks.

use crate::utils::error::{MoittError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Polls `condition` every `interval` until it reports ready or `timeout` elapses.
///
/// Errors from the condition end the wait immediately.
pub async fn wait_until<F, Fut>(what: &str, timeout: Duration, interval: Duration, mut condition: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        if condition().await? {
            tracing::info!("✅ {} ready after {:?}", what, start.elapsed());
            return Ok(());
        }
        if start.elapsed() + interval > timeout {
            return Err(MoittError::Timeout {
                what: what.to_string(),
                seconds: timeout.as_secs(),
            });
        }
        tracing::debug!("{} not ready yet (attempt {}), retrying in {:?}", what, attempt, interval);
        tokio::time::sleep(interval).await;
    }
}
