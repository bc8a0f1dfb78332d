//! Periodic endpoint health checking.
//!
//! # Responsibilities
//! - Drive `ConnectionManager::check_health` on a fixed interval
//! - Stop cleanly on the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::chain::manager::ConnectionManager;
use crate::config::HealthCheckConfig;

pub struct HealthMonitor {
    manager: Arc<ConnectionManager>,
    config: HealthCheckConfig,
}

impl HealthMonitor {
    pub fn new(manager: Arc<ConnectionManager>, config: HealthCheckConfig) -> Self {
        Self { manager, config }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Endpoint health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            endpoints = self.manager.endpoint_count(),
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.manager.check_health().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
