//! RPC Gateway Library
//!
//! Blockchain connectivity layer for a prediction-market platform: a pooled
//! JSON-RPC connection manager with health checking and failover, a
//! rate-limit-aware backoff executor for the REST backend, and an HTTP relay
//! that forwards raw JSON-RPC bodies to the first live endpoint.

pub mod chain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use chain::manager::ConnectionManager;
pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
