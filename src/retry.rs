use std::time::Duration;

use log::debug;

use crate::error::{Error, Result};

const BASE_DELAY_MS: u64 = 500;

/// Delay before retry number `attempt + 1`; saturates instead of overflowing.
fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(BASE_DELAY_MS.saturating_mul(2u64.saturating_pow(attempt)))
}

/// Retry an async operation with exponential backoff.
///
/// Only errors for which [`Error::is_retryable`] holds are retried; anything
/// else is returned straight away. `max_attempts` below one is treated as one.
pub async fn retry<F, Fut, T>(max_attempts: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                let delay = backoff(attempt);
                debug!("Attempt {} failed: {e}, retrying in {delay:?}", attempt + 1);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Error out when `max_attempts` exceeds what a caller would sensibly wait for.
pub fn check_attempts(max_attempts: u32) -> Result<u32> {
    match max_attempts {
        1..=5 => Ok(max_attempts),
        n => Err(Error::Config(format!("max_attempts must be between 1 and 5, got {n}"))),
    }
}
