//! Pooled RPC connection manager with failover.
//!
//! # Responsibilities
//! - Hold one provider per configured endpoint URL
//! - Hand callers an endpoint believed to be live
//! - Rotate away from failing endpoints and retry with a bounded budget
//! - Expose the liveness probe used by the periodic health monitor
//!
//! # Design Decisions
//! - `current` and `healthy` are Relaxed atomics: the worst outcome of a
//!   race between concurrent callers is a sub-optimal endpoint pick
//! - `healthy_client` awaits each candidate probe before selecting it
//! - Retry delay on this path is fixed, not exponential; every attempt after
//!   a failure runs against the next endpoint in the pool

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::client::ClientBuilder;
use alloy::transports::layers::RetryBackoffLayer;
use tokio::time::timeout;
use url::Url;

use crate::chain::types::{ChainConfig, ChainError, ChainId, ChainResult};
use crate::config::RetryConfig;
use crate::observability::metrics;

/// A single pooled endpoint: its URL and a ready-to-use provider.
#[derive(Clone)]
pub struct ManagedEndpoint {
    pub url: Url,
    pub provider: Arc<dyn Provider + Send + Sync>,
}

impl std::fmt::Debug for ManagedEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedEndpoint")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

/// Shared view of endpoint health for the whole process.
///
/// Constructed once at startup and passed around as an `Arc` handle.
pub struct ConnectionManager {
    endpoints: Vec<ManagedEndpoint>,
    current: AtomicUsize,
    healthy: AtomicBool,
    chain_id: u64,
    request_timeout: Duration,
    probe_timeout: Duration,
    retry: RetryConfig,
}

impl ConnectionManager {
    /// Build one provider per configured URL. Invalid URLs are skipped with
    /// a warning; an empty result is an error (validation normally catches
    /// this earlier).
    pub fn new(
        config: &ChainConfig,
        retry: RetryConfig,
        probe_timeout: Duration,
    ) -> ChainResult<Self> {
        let mut endpoints = Vec::new();
        for url_str in &config.rpc_urls {
            match url_str.parse::<Url>() {
                Ok(url) => {
                    // Transport-level retries absorb transient faults on one
                    // endpoint; rotation across endpoints happens above this.
                    let retry_layer = RetryBackoffLayer::new(
                        config.transport_retry_count,
                        config.transport_retry_delay_ms,
                        u64::MAX, // compute units per second, unmetered
                    );
                    let client = ClientBuilder::default()
                        .layer(retry_layer)
                        .http(url.clone());
                    let provider = Arc::new(ProviderBuilder::new().connect_client(client))
                        as Arc<dyn Provider + Send + Sync>;
                    endpoints.push(ManagedEndpoint { url, provider });
                }
                Err(e) => {
                    tracing::warn!(url = %url_str, error = %e, "Ignoring invalid RPC URL");
                }
            }
        }

        if endpoints.is_empty() {
            return Err(ChainError::NoEndpoint(
                "endpoint pool is empty after URL parsing".to_string(),
            ));
        }

        tracing::info!(
            endpoint_count = endpoints.len(),
            chain_id = config.chain_id,
            "Connection manager initialized"
        );

        Ok(Self {
            endpoints,
            current: AtomicUsize::new(0),
            healthy: AtomicBool::new(true),
            chain_id: config.chain_id,
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            probe_timeout,
            retry,
        })
    }

    /// Number of endpoints in the pool.
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Index of the currently preferred endpoint.
    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    /// Whether the pool is currently assumed healthy.
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    /// Return the endpoint at the current index. No I/O.
    pub fn current_client(&self) -> ManagedEndpoint {
        self.endpoints[self.current_index() % self.endpoints.len()].clone()
    }

    /// Advance the current index to the next endpoint, wrapping around.
    pub fn switch_to_next(&self) {
        let next = (self.current.load(Ordering::Relaxed) + 1) % self.endpoints.len();
        self.current.store(next, Ordering::Relaxed);
        metrics::record_failover();
        tracing::debug!(index = next, "Switched to next RPC endpoint");
    }

    /// Fast path returns the current endpoint while the pool is assumed
    /// healthy. Otherwise scan from index 0 and select the first endpoint
    /// whose liveness probe succeeds. An exhausted scan falls back to the
    /// current endpoint regardless of true health.
    pub async fn healthy_client(&self) -> ManagedEndpoint {
        if self.is_healthy() {
            return self.current_client();
        }

        for (index, endpoint) in self.endpoints.iter().enumerate() {
            match self.probe(endpoint).await {
                Ok(block) => {
                    self.current.store(index, Ordering::Relaxed);
                    self.healthy.store(true, Ordering::Relaxed);
                    tracing::info!(
                        endpoint = %endpoint.url,
                        block,
                        "Recovered a live RPC endpoint"
                    );
                    return endpoint.clone();
                }
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint.url, error = %e, "Endpoint probe failed");
                }
            }
        }

        tracing::warn!("No live RPC endpoint found, falling back to current");
        self.current_client()
    }

    /// Probe the current endpoint. Success marks the pool healthy; failure
    /// marks it unhealthy and advances to the next endpoint. Invoked by the
    /// periodic health monitor.
    pub async fn check_health(&self) -> bool {
        let endpoint = self.current_client();
        match self.probe(&endpoint).await {
            Ok(block) => {
                self.healthy.store(true, Ordering::Relaxed);
                metrics::record_endpoint_health(endpoint.url.as_str(), true);
                tracing::debug!(endpoint = %endpoint.url, block, "Health check passed");
                true
            }
            Err(e) => {
                self.healthy.store(false, Ordering::Relaxed);
                metrics::record_endpoint_health(endpoint.url.as_str(), false);
                tracing::warn!(endpoint = %endpoint.url, error = %e, "Health check failed");
                self.switch_to_next();
                false
            }
        }
    }

    /// Run `op` against a live endpoint with the configured retry budget.
    pub async fn execute_with_retry<T, F, Fut>(&self, op: F) -> ChainResult<T>
    where
        F: Fn(ManagedEndpoint) -> Fut,
        Fut: Future<Output = ChainResult<T>> + Send,
    {
        self.execute_with_retry_limit(op, self.retry.max_retries).await
    }

    /// Like [`execute_with_retry`](Self::execute_with_retry) with an explicit
    /// retry budget. Performs at most `max_retries + 1` attempts; each
    /// failure rotates to the next endpoint and pauses for the fixed delay.
    pub async fn execute_with_retry_limit<T, F, Fut>(
        &self,
        op: F,
        max_retries: u32,
    ) -> ChainResult<T>
    where
        F: Fn(ManagedEndpoint) -> Fut,
        Fut: Future<Output = ChainResult<T>> + Send,
    {
        let mut last_error: Option<ChainError> = None;

        for attempt in 0..=max_retries {
            let client = self.healthy_client().await;
            let outcome = match timeout(self.request_timeout, op(client)).await {
                Ok(result) => result,
                Err(_) => Err(ChainError::Timeout(self.request_timeout.as_millis() as u64)),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_retries,
                        error = %e,
                        "RPC operation failed"
                    );
                    last_error = Some(e);
                    if attempt < max_retries {
                        self.switch_to_next();
                        tokio::time::sleep(Duration::from_millis(self.retry.delay_ms)).await;
                    }
                }
            }
        }

        Err(ChainError::RetriesExhausted {
            attempts: max_retries + 1,
            last: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    /// Fetch the latest block number with failover.
    pub async fn block_number(&self) -> ChainResult<u64> {
        self.execute_with_retry(|endpoint| async move {
            endpoint
                .provider
                .get_block_number()
                .await
                .map_err(|e| ChainError::Rpc(e.to_string()))
        })
        .await
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> ChainResult<()> {
        let reported = self
            .execute_with_retry(|endpoint| async move {
                endpoint
                    .provider
                    .get_chain_id()
                    .await
                    .map_err(|e| ChainError::Rpc(e.to_string()))
            })
            .await?;

        if reported != self.chain_id {
            return Err(ChainError::ChainMismatch {
                expected: self.chain_id,
                actual: reported,
            });
        }
        Ok(())
    }

    /// Expected chain ID.
    pub fn chain_id(&self) -> ChainId {
        ChainId(self.chain_id)
    }

    async fn probe(&self, endpoint: &ManagedEndpoint) -> ChainResult<u64> {
        match timeout(self.probe_timeout, endpoint.provider.get_block_number()).await {
            Ok(Ok(block)) => Ok(block),
            Ok(Err(e)) => Err(ChainError::Rpc(e.to_string())),
            Err(_) => Err(ChainError::Timeout(self.probe_timeout.as_millis() as u64)),
        }
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("endpoint_count", &self.endpoints.len())
            .field("current", &self.current_index())
            .field("healthy", &self.is_healthy())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}
