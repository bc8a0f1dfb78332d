//! Generic pass-through to the external REST backend.
//!
//! # Responsibilities
//! - Resolve `/api/<prefix>/...` against the configured route table
//! - Forward the request with default query parameters injected
//! - Retry rate-limited fetches via the backoff executor
//! - Normalize every outcome into the API envelope
//!
//! # Design Decisions
//! - One generic handler instead of one handcrafted handler per route
//! - Backend failures never surface as raw errors: callers get a
//!   well-formed envelope with `degraded: true`

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;

use crate::config::schema::ProxyRouteConfig;
use crate::http::response::ApiEnvelope;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::resilience::retry::{retry_on_rate_limit, RetryableStatus};

/// Failure while fetching from the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend returned HTTP {status}")]
    Http { status: u16, body: String },

    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl RetryableStatus for BackendError {
    fn status(&self) -> Option<u16> {
        match self {
            BackendError::Http { status, .. } => Some(*status),
            BackendError::Request(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Resolved route table: longest-prefix match over the configured entries.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<ProxyRouteConfig>,
}

impl RouteTable {
    pub fn new(mut routes: Vec<ProxyRouteConfig>) -> Self {
        // Longer prefixes first so "oddyssey/slips" wins over "oddyssey".
        routes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { routes }
    }

    /// Match a path (relative to `/api/`) and return the route plus the
    /// unmatched remainder.
    pub fn resolve<'a>(&'a self, path: &'a str) -> Option<(&'a ProxyRouteConfig, &'a str)> {
        self.routes.iter().find_map(|route| {
            let rest = path.strip_prefix(&route.prefix)?;
            if rest.is_empty() || rest.starts_with('/') {
                Some((route, rest))
            } else {
                None
            }
        })
    }
}

/// `ANY /api/{*path}`: forward to the backend and wrap the response.
pub async fn forward(
    State(state): State<AppState>,
    Path(path): Path<String>,
    method: Method,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let start = std::time::Instant::now();
    let method_name = method.to_string();

    let Some((route, remainder)) = state.routes.resolve(&path) else {
        tracing::debug!(path = %path, "No backend route matched");
        metrics::record_request(&method_name, 404, start);
        return (
            StatusCode::NOT_FOUND,
            Json(ApiEnvelope::<Value>::error("Unknown API route")),
        )
            .into_response();
    };

    let query_string = merge_query(&route.default_params, query.as_deref());
    let url = format!(
        "{}{}{}{}",
        state.backend_base, route.target, remainder, query_string
    );
    let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .unwrap_or(reqwest::Method::GET);

    let result = retry_on_rate_limit(&state.backoff, || {
        let client = state.backend_client.clone();
        let url = url.clone();
        let method = method.clone();
        let body = body.clone();
        async move {
            let mut request = client.request(method, url.as_str());
            if !body.is_empty() {
                request = request
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body.to_vec());
            }
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(BackendError::Http {
                    status: status.as_u16(),
                    body,
                });
            }
            Ok(response.json::<Value>().await?)
        }
    })
    .await;

    match result {
        Ok(value) => {
            metrics::record_request(&method_name, 200, start);
            (StatusCode::OK, Json(normalize(value))).into_response()
        }
        Err(e) => {
            tracing::error!(url = %url, error = %e, "Backend fetch failed, degrading");
            metrics::record_request(&method_name, 502, start);
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiEnvelope::<Value>::degraded(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Build the forwarded query string. Caller pairs are passed through
/// byte-for-byte (still percent-encoded, repeats intact); default params are
/// appended only for keys the caller did not supply.
fn merge_query(defaults: &[(String, String)], query: Option<&str>) -> String {
    let caller = query.unwrap_or("");
    let mut pairs: Vec<String> = caller
        .split('&')
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    for (key, value) in defaults {
        let supplied = pairs
            .iter()
            .any(|pair| pair.split('=').next().unwrap_or(pair) == key.as_str());
        if !supplied {
            pairs.push(format!("{}={}", key, value));
        }
    }

    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

/// Backends that already speak the envelope are passed through; anything
/// else becomes the `data` field of a fresh success envelope.
fn normalize(value: Value) -> Value {
    match value.as_object() {
        Some(object) if object.get("success").map(Value::is_boolean) == Some(true) => value,
        _ => serde_json::to_value(ApiEnvelope::ok(value)).unwrap_or(Value::Null),
    }
}
