//! Raw JSON-RPC relay.
//!
//! # Responsibilities
//! - Accept an opaque JSON-RPC POST body
//! - Forward it byte-for-byte to each pooled endpoint in priority order
//! - Return the first successful response with permissive CORS headers
//! - Answer CORS preflights
//!
//! # Design Decisions
//! - Single pass over the pool, no per-endpoint retry; failover only
//! - Per-endpoint failures are logged and skipped, never surfaced mid-scan
//! - Total failure is a 503 with a fixed JSON error body

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::time::timeout;

use crate::http::response::cors_headers;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Largest relayed response body we will buffer.
const MAX_RELAY_BODY: usize = 2 * 1024 * 1024;

/// `POST /api/rpc-proxy`: forward the body to the first live endpoint.
pub async fn relay(State(state): State<AppState>, body: Bytes) -> Response {
    for endpoint in state.endpoints.iter() {
        let request = match Request::builder()
            .method(Method::POST)
            .uri(endpoint.as_str())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.clone()))
        {
            Ok(req) => req,
            Err(e) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "Failed to build relay request");
                continue;
            }
        };

        let response = match timeout(state.relay_timeout, state.relay_client.request(request)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "RPC endpoint unreachable");
                metrics::record_relay_attempt(endpoint.as_str(), false);
                continue;
            }
            Err(_) => {
                tracing::warn!(endpoint = %endpoint, "RPC endpoint timed out");
                metrics::record_relay_attempt(endpoint.as_str(), false);
                continue;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                endpoint = %endpoint,
                status = %response.status(),
                "RPC endpoint returned non-success status"
            );
            metrics::record_relay_attempt(endpoint.as_str(), false);
            continue;
        }

        match axum::body::to_bytes(Body::new(response.into_body()), MAX_RELAY_BODY).await {
            Ok(bytes) => {
                metrics::record_relay_attempt(endpoint.as_str(), true);
                return (
                    StatusCode::OK,
                    cors_headers(),
                    [(header::CONTENT_TYPE, "application/json")],
                    bytes,
                )
                    .into_response();
            }
            Err(e) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "Failed to read relay response");
                metrics::record_relay_attempt(endpoint.as_str(), false);
            }
        }
    }

    tracing::error!("All RPC endpoints failed for relayed request");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        cors_headers(),
        [(header::CONTENT_TYPE, "application/json")],
        r#"{"error":"All RPC endpoints failed"}"#,
    )
        .into_response()
}

/// `OPTIONS /api/rpc-proxy`: CORS preflight.
pub async fn preflight() -> Response {
    (StatusCode::OK, cors_headers()).into_response()
}
