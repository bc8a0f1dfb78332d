//! Rate-limit retry executor.
//!
//! # Responsibilities
//! - Wrap a fallible async operation against the REST backend
//! - Retry only when the error carries HTTP 429, with doubling capped delay
//! - Rethrow every other error immediately, with zero extra attempts
//!
//! # Design Decisions
//! - Retry policy dispatches on a typed status field, never on error text
//! - Callers degrade to a fallback envelope on exhaustion; this executor
//!   does not substitute data itself

use std::future::Future;

use crate::config::BackoffConfig;
use crate::resilience::backoff::capped_exponential;

const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// Errors eligible for rate-limit retry expose their HTTP status, if any.
pub trait RetryableStatus {
    fn status(&self) -> Option<u16>;
}

/// Run `op`, retrying on HTTP 429 up to `config.max_retries` times with
/// `min(base * 2^n, max)` delays. Any other failure is returned on the
/// first attempt it occurs.
pub async fn retry_on_rate_limit<T, E, F, Fut>(config: &BackoffConfig, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableStatus + std::fmt::Display,
{
    let mut retries = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if retries >= config.max_retries || e.status() != Some(HTTP_TOO_MANY_REQUESTS) {
                    return Err(e);
                }
                let delay = capped_exponential(retries, config.base_delay_ms, config.max_delay_ms);
                tracing::debug!(
                    retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                retries += 1;
            }
        }
    }
}
