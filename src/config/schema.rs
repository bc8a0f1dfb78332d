//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the RPC gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Chain identity and RPC endpoint pool.
    pub chain: ChainConfig,

    /// Health check settings for the endpoint pool.
    pub health_check: HealthCheckConfig,

    /// Retry settings for `execute_with_retry` (fixed delay, endpoint rotation).
    pub retries: RetryConfig,

    /// Backoff settings for the rate-limit retry executor.
    pub backoff: BackoffConfig,

    /// External REST backend settings and pass-through route table.
    pub backend: BackendConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Chain identity and RPC endpoint pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Chain ID the pool is bound to (e.g., 50312 for Somnia testnet).
    pub chain_id: u64,

    /// Native currency symbol.
    pub currency_symbol: String,

    /// Native currency decimals.
    pub currency_decimals: u8,

    /// Block explorer base URL.
    pub explorer_url: String,

    /// Ordered JSON-RPC endpoint URLs. Order defines failover priority:
    /// the relay tries index 0 first, the manager cycles through all.
    pub rpc_urls: Vec<String>,

    /// Per-request timeout in milliseconds, applied to every RPC call.
    pub request_timeout_ms: u64,

    /// Transport-level retries per RPC request, applied inside each
    /// provider before the manager's endpoint rotation kicks in.
    pub transport_retry_count: u32,

    /// Initial transport-level retry backoff in milliseconds.
    pub transport_retry_delay_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 50312,
            currency_symbol: "STT".to_string(),
            currency_decimals: 18,
            explorer_url: "https://shannon-explorer.somnia.network".to_string(),
            rpc_urls: vec![
                "https://dream-rpc.somnia.network".to_string(),
                "https://rpc.ankr.com/somnia_testnet".to_string(),
            ],
            request_timeout_ms: 10_000,
            transport_retry_count: 3,
            transport_retry_delay_ms: 150,
        }
    }
}

/// Health check configuration for the endpoint pool.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the periodic health monitor.
    pub enabled: bool,

    /// Probe interval in seconds.
    pub interval_secs: u64,

    /// Per-probe timeout in seconds.
    pub probe_timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
            probe_timeout_secs: 5,
        }
    }
}

/// Retry configuration for the connection manager.
///
/// This path rotates to a different endpoint between attempts, so the delay
/// is a short fixed pause rather than an exponential backoff.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,

    /// Fixed delay between attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 1000,
        }
    }
}

/// Backoff configuration for the rate-limit retry executor.
///
/// This path re-hits the same backend, so delays double up to a cap.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,

    /// Base delay in milliseconds.
    pub base_delay_ms: u64,

    /// Delay cap in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

/// A single pass-through route: requests under `/api/<prefix>` are forwarded
/// to `<base_url><target><remainder>`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyRouteConfig {
    /// First path segment after `/api/` to match (e.g., "pools").
    pub prefix: String,

    /// Target path on the backend (e.g., "/api/v1/pools").
    pub target: String,

    /// Query parameters injected when the caller does not supply them.
    #[serde(default)]
    pub default_params: Vec<(String, String)>,
}

/// External REST backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend service.
    pub base_url: String,

    /// Request timeout in seconds for backend fetches.
    pub request_timeout_secs: u64,

    /// Pass-through route table.
    pub routes: Vec<ProxyRouteConfig>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            request_timeout_secs: 15,
            routes: default_routes(),
        }
    }
}

fn default_routes() -> Vec<ProxyRouteConfig> {
    let route = |prefix: &str, target: &str| ProxyRouteConfig {
        prefix: prefix.to_string(),
        target: target.to_string(),
        default_params: Vec::new(),
    };
    vec![
        ProxyRouteConfig {
            prefix: "pools".to_string(),
            target: "/api/v1/pools".to_string(),
            default_params: vec![("limit".to_string(), "20".to_string())],
        },
        route("analytics", "/api/v1/analytics"),
        route("staking", "/api/v1/staking"),
        route("oddyssey", "/api/v1/oddyssey"),
        route("social", "/api/v1/social"),
        route("airdrop", "/api/v1/airdrop"),
        route("faucet", "/api/v1/faucet"),
    ]
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
