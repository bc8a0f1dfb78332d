//! Chain connectivity subsystem.
//!
//! # Data Flow
//! ```text
//! Caller (handler, startup check)
//!     → manager.rs  execute_with_retry(op)
//!         → healthy_client() picks the current or first probe-alive endpoint
//!         → op runs against that endpoint
//!         → on failure: switch_to_next() + fixed delay, bounded attempts
//!
//! Periodic (monitor.rs):
//!     interval tick → check_health() probes the current endpoint
//!     → success: healthy = true
//!     → failure: healthy = false, advance to the next endpoint
//! ```
//!
//! # Design Decisions
//! - One shared manager per process, passed as an explicit Arc handle
//! - Failover state (current index, healthy flag) is atomic and best-effort;
//!   a race between concurrent callers costs a sub-optimal endpoint pick
//! - No circuit breaker: every call starts the retry loop fresh

pub mod manager;
pub mod monitor;
pub mod types;

pub use manager::{ConnectionManager, ManagedEndpoint};
pub use monitor::HealthMonitor;
pub use types::{ChainError, ChainId, ChainResult};
