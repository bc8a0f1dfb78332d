//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Spawn the endpoint health monitor
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;

use crate::chain::manager::ConnectionManager;
use crate::chain::monitor::HealthMonitor;
use crate::config::{BackoffConfig, ChainConfig, GatewayConfig};
use crate::http::backend_proxy::{self, RouteTable};
use crate::http::request::RequestIdLayer;
use crate::http::response::ApiEnvelope;
use crate::http::rpc_proxy;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ConnectionManager>,
    pub chain: Arc<ChainConfig>,
    pub relay_client: Client<HttpConnector, Body>,
    pub backend_client: reqwest::Client,
    pub endpoints: Arc<Vec<Url>>,
    pub routes: Arc<RouteTable>,
    pub relay_timeout: Duration,
    pub backoff: BackoffConfig,
    pub backend_base: String,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    manager: Arc<ConnectionManager>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and manager.
    /// Fails if the backend HTTP client cannot be built, since falling back
    /// to a default client would drop the configured timeout.
    pub fn new(
        config: GatewayConfig,
        manager: Arc<ConnectionManager>,
    ) -> Result<Self, reqwest::Error> {
        let relay_client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let backend_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend.request_timeout_secs))
            .build()?;

        let endpoints: Vec<Url> = config
            .chain
            .rpc_urls
            .iter()
            .filter_map(|raw| match raw.parse() {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(url = %raw, error = %e, "Skipping invalid relay endpoint");
                    None
                }
            })
            .collect();

        let state = AppState {
            manager: manager.clone(),
            chain: Arc::new(config.chain.clone()),
            relay_client,
            backend_client,
            endpoints: Arc::new(endpoints),
            routes: Arc::new(RouteTable::new(config.backend.routes.clone())),
            relay_timeout: Duration::from_millis(config.chain.request_timeout_ms),
            backoff: config.backoff,
            backend_base: config.backend.base_url.trim_end_matches('/').to_string(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            manager,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route(
                "/api/rpc-proxy",
                post(rpc_proxy::relay).options(rpc_proxy::preflight),
            )
            .route("/api/health", get(health_handler))
            .route("/api/{*path}", any(backend_proxy::forward))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.backend.request_timeout_secs + 5,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.config.health_check.enabled {
            let monitor = HealthMonitor::new(self.manager.clone(), self.config.health_check.clone());
            let monitor_shutdown = shutdown.subscribe();
            tokio::spawn(async move {
                monitor.run(monitor_shutdown).await;
            });
        }

        let mut rx = shutdown.subscribe();
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = rx.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// `GET /api/health`: gateway self-report.
async fn health_handler(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    let endpoint = state.manager.current_client();
    let body = Json(ApiEnvelope::ok(serde_json::json!({
        "healthy": state.manager.is_healthy(),
        "endpoint": endpoint.url.as_str(),
        "endpoint_index": state.manager.current_index(),
        "pool_size": state.manager.endpoint_count(),
        "chain_id": u64::from(state.manager.chain_id()),
        "currency_symbol": state.chain.currency_symbol,
        "currency_decimals": state.chain.currency_decimals,
        "explorer_url": state.chain.explorer_url,
    })));
    metrics::record_request("GET", 200, start);
    (StatusCode::OK, body).into_response()
}
