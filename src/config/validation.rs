//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parseable)
//! - Check the endpoint pool invariant (non-empty, parseable URLs)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyEndpointPool,
    InvalidEndpointUrl { url: String, reason: String },
    InvalidBindAddress(String),
    InvalidBackendUrl { url: String, reason: String },
    ZeroDuration(&'static str),
    BackoffCapBelowBase { base_ms: u64, max_ms: u64 },
    EmptyRoutePrefix,
    BadRouteTarget(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyEndpointPool => {
                write!(f, "chain.rpc_urls must contain at least one endpoint")
            }
            ValidationError::InvalidEndpointUrl { url, reason } => {
                write!(f, "invalid RPC endpoint URL '{}': {}", url, reason)
            }
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "invalid bind address '{}'", addr)
            }
            ValidationError::InvalidBackendUrl { url, reason } => {
                write!(f, "invalid backend base URL '{}': {}", url, reason)
            }
            ValidationError::ZeroDuration(field) => {
                write!(f, "{} must be greater than zero", field)
            }
            ValidationError::BackoffCapBelowBase { base_ms, max_ms } => {
                write!(
                    f,
                    "backoff.max_delay_ms ({}) is below backoff.base_delay_ms ({})",
                    max_ms, base_ms
                )
            }
            ValidationError::EmptyRoutePrefix => {
                write!(f, "backend route with empty prefix")
            }
            ValidationError::BadRouteTarget(target) => {
                write!(f, "backend route target '{}' must start with '/'", target)
            }
        }
    }
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.chain.rpc_urls.is_empty() {
        errors.push(ValidationError::EmptyEndpointPool);
    }
    for url in &config.chain.rpc_urls {
        if let Err(e) = url.parse::<Url>() {
            errors.push(ValidationError::InvalidEndpointUrl {
                url: url.clone(),
                reason: e.to_string(),
            });
        }
    }

    if let Err(e) = config.backend.base_url.parse::<Url>() {
        errors.push(ValidationError::InvalidBackendUrl {
            url: config.backend.base_url.clone(),
            reason: e.to_string(),
        });
    }

    if config.chain.request_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration("chain.request_timeout_ms"));
    }
    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::ZeroDuration("health_check.interval_secs"));
    }
    if config.health_check.probe_timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration(
            "health_check.probe_timeout_secs",
        ));
    }
    if config.backend.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration(
            "backend.request_timeout_secs",
        ));
    }

    if config.backoff.max_delay_ms < config.backoff.base_delay_ms {
        errors.push(ValidationError::BackoffCapBelowBase {
            base_ms: config.backoff.base_delay_ms,
            max_ms: config.backoff.max_delay_ms,
        });
    }

    for route in &config.backend.routes {
        if route.prefix.is_empty() {
            errors.push(ValidationError::EmptyRoutePrefix);
        }
        if !route.target.starts_with('/') {
            errors.push(ValidationError::BadRouteTarget(route.target.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
