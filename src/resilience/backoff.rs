//! Capped exponential backoff.

use std::time::Duration;

/// Delay before retry number `retry` (0-based): `min(base * 2^retry, max)`.
pub fn capped_exponential(retry: u32, base_ms: u64, max_ms: u64) -> Duration {
    let multiplier = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
    let delay_ms = base_ms.saturating_mul(multiplier).min(max_ms);
    Duration::from_millis(delay_ms)
}
