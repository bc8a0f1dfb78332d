//! Response envelope and CORS helpers.
//!
//! # Responsibilities
//! - Normalize every API response into `{ success, data, message }`
//! - Mark fallback payloads with an explicit `degraded` flag
//! - Provide the permissive CORS header set used by the RPC relay

use axum::http::{header, HeaderName};
use serde::Serialize;

/// JSON envelope returned by every `/api/*` route.
#[derive(Debug, Clone, Serialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// True when the payload is a fallback produced after a backend failure.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            degraded: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            degraded: false,
        }
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            degraded: true,
        }
    }
}

/// Permissive CORS headers attached to relay responses and preflights.
pub fn cors_headers() -> [(HeaderName, &'static str); 3] {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
    ]
}
