//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Build manager → Start server + monitor
//!
//! Shutdown (shutdown.rs):
//!     SIGINT received → broadcast signal → server drains, monitor exits
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
