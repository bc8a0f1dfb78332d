//! Connection manager failover tests against live mock nodes.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rpc_gateway::chain::{ChainError, ConnectionManager};
use rpc_gateway::config::{ChainConfig, RetryConfig};

mod common;

fn manager_for(urls: Vec<String>, chain_id: u64, max_retries: u32) -> ConnectionManager {
    let config = ChainConfig {
        chain_id,
        rpc_urls: urls,
        request_timeout_ms: 3_000,
        transport_retry_delay_ms: 10,
        ..ChainConfig::default()
    };
    let retry = RetryConfig {
        max_retries,
        delay_ms: 10,
    };
    ConnectionManager::new(&config, retry, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_check_health_transitions() {
    let healthy = Arc::new(AtomicBool::new(true));
    let hits = Arc::new(AtomicU32::new(0));
    let node = common::start_json_rpc_node(healthy.clone(), hits.clone()).await;

    let manager = manager_for(vec![format!("http://{}", node)], 50312, 0);

    assert!(manager.check_health().await);
    assert!(manager.is_healthy());

    healthy.store(false, Ordering::SeqCst);
    assert!(!manager.check_health().await);
    assert!(!manager.is_healthy());
    // Single-endpoint pool: the advance wraps back to index 0.
    assert_eq!(manager.current_index(), 0);

    healthy.store(true, Ordering::SeqCst);
    assert!(manager.check_health().await);
    assert!(manager.is_healthy());
}

#[tokio::test]
async fn test_failed_health_check_advances_index() {
    let dead = common::start_refusing_backend().await;
    let healthy = Arc::new(AtomicBool::new(true));
    let hits = Arc::new(AtomicU32::new(0));
    let live = common::start_json_rpc_node(healthy, hits).await;

    let manager = manager_for(
        vec![format!("http://{}", dead), format!("http://{}", live)],
        50312,
        1,
    );

    assert!(!manager.check_health().await);
    assert_eq!(manager.current_index(), 1);
    assert!(!manager.is_healthy());

    // The next caller scans from index 0 and lands on the live node.
    let endpoint = manager.healthy_client().await;
    assert_eq!(endpoint.url.port(), Some(live.port()));
    assert_eq!(manager.current_index(), 1);
    assert!(manager.is_healthy());
}

#[tokio::test]
async fn test_execute_with_retry_fails_over_to_live_node() {
    let dead = common::start_refusing_backend().await;
    let healthy = Arc::new(AtomicBool::new(true));
    let hits = Arc::new(AtomicU32::new(0));
    let live = common::start_json_rpc_node(healthy, hits.clone()).await;

    let manager = manager_for(
        vec![format!("http://{}", dead), format!("http://{}", live)],
        50312,
        1,
    );

    let block = manager.block_number().await.unwrap();
    assert_eq!(block, 100);
    assert_eq!(manager.current_index(), 1);
    assert!(hits.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn test_transport_retries_absorb_rate_limits() {
    // The node rejects the first two requests with 429; the provider's
    // transport retry layer rides them out without touching the pool index.
    let hits = Arc::new(AtomicU32::new(0));
    let node = common::start_flaky_json_rpc_node(2, hits.clone()).await;

    let config = ChainConfig {
        chain_id: 50312,
        rpc_urls: vec![format!("http://{}", node)],
        request_timeout_ms: 3_000,
        transport_retry_count: 3,
        transport_retry_delay_ms: 10,
        ..ChainConfig::default()
    };
    let retry = RetryConfig {
        max_retries: 0,
        delay_ms: 10,
    };
    let manager = ConnectionManager::new(&config, retry, Duration::from_secs(2)).unwrap();

    let block = manager.block_number().await.unwrap();
    assert_eq!(block, 100);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(manager.current_index(), 0);
}

#[tokio::test]
async fn test_all_endpoints_down_exhausts_retries() {
    let dead_a = common::start_refusing_backend().await;
    let dead_b = common::start_refusing_backend().await;

    let manager = manager_for(
        vec![format!("http://{}", dead_a), format!("http://{}", dead_b)],
        50312,
        2,
    );

    let result = manager.block_number().await;
    match result {
        Err(ChainError::RetriesExhausted { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected RetriesExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_verify_chain_id() {
    let healthy = Arc::new(AtomicBool::new(true));
    let hits = Arc::new(AtomicU32::new(0));
    let node = common::start_json_rpc_node(healthy, hits).await;
    let url = format!("http://{}", node);

    let manager = manager_for(vec![url.clone()], 50312, 0);
    assert!(manager.verify_chain_id().await.is_ok());

    let manager = manager_for(vec![url], 1, 0);
    match manager.verify_chain_id().await {
        Err(ChainError::ChainMismatch { expected, actual }) => {
            assert_eq!(expected, 1);
            assert_eq!(actual, 50312);
        }
        other => panic!("expected ChainMismatch, got {:?}", other),
    }
}
