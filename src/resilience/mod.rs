//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Backend fetch:
//!     → retry.rs (retry only on typed HTTP 429, doubling capped delay)
//!     → backoff.rs (delay calculation)
//!
//! Chain reads use the connection manager's own fixed-delay retry loop;
//! the two policies are intentionally different: chain retries rotate to a
//! different endpoint, backend retries re-hit the same recovering service.
//! ```

pub mod backoff;
pub mod retry;

pub use backoff::capped_exponential;
pub use retry::{retry_on_rate_limit, RetryableStatus};
