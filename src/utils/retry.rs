use std::future::Future;
use std::time::Duration;

use crate::model::StoreResult;

/// Runs an idempotent store read, retrying transient failures with
/// exponential backoff (`base_delay`, `2 * base_delay`, ...).
pub async fn retry_with_backoff<T, F, Fut>(
    attempts: u32,
    base_delay: Duration,
    what: &str,
    mut op: F,
) -> StoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < attempts => {
                let delay = base_delay.saturating_mul(1 << (attempt - 1).min(16));
                tracing::warn!(
                    "{} failed (attempt {}/{}): {}, retrying in {:?}",
                    what,
                    attempt,
                    attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
