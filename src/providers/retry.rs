// Retry logic with exponential backoff

use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;

const MAX_RETRIES: u32 = 3;
const BASE_DELAY_MS: u64 = 1000;

/// Execute a function with exponential backoff retry logic
pub async fn with_retry<F, Fut, T>(f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    with_retry_policy(MAX_RETRIES, Duration::from_millis(BASE_DELAY_MS), f).await
}

/// Same as `with_retry` with an explicit attempt count and base delay
pub async fn with_retry_policy<F, Fut, T>(max_retries: u32, base_delay: Duration, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let max_retries = max_retries.max(1);
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt + 1 >= max_retries => return Err(e),
            Err(e) => {
                let delay = base_delay * 2u32.pow(attempt);
                tracing::warn!(
                    "Request failed (attempt {}/{}), retrying in {:?}: {}",
                    attempt + 1,
                    max_retries,
                    delay,
                    e
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
