//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: timeout, request ID, trace)
//!     → POST /api/rpc-proxy   → rpc_proxy.rs (endpoint-ordered relay)
//!     → GET  /api/health      → server.rs (manager self-report)
//!     → ANY  /api/{*path}     → backend_proxy.rs (pass-through + envelope)
//! ```

pub mod backend_proxy;
pub mod request;
pub mod response;
pub mod rpc_proxy;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use response::ApiEnvelope;
pub use server::HttpServer;
