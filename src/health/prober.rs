//! Active health probing.
//!
//! # Responsibilities
//! - Periodically probe every registered service's liveness endpoint
//! - Report outcomes back to the registry

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::registry::core::ServiceRegistry;

/// Result of one liveness probe. `Err` carries the failure message recorded
/// on the entry.
pub struct ProbeOutcome {
    pub name: String,
    pub result: Result<(), String>,
}

/// Periodic prober owned by the registry.
pub struct HealthProber {
    registry: Arc<ServiceRegistry>,
    config: HealthCheckConfig,
    client: reqwest::Client,
}

impl HealthProber {
    pub fn new(registry: Arc<ServiceRegistry>, config: HealthCheckConfig) -> Self {
        Self {
            registry,
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Run until the shutdown signal fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = self.config.interval_secs,
            path = %self.config.path,
            "Health prober starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health prober received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every current entry concurrently and apply the outcomes.
    async fn sweep(&self) {
        let targets = self.registry.probe_targets().await;
        if targets.is_empty() {
            return;
        }

        let probes = targets
            .into_iter()
            .map(|(name, address)| self.probe(name, address));
        let outcomes = join_all(probes).await;

        self.registry.apply_probe_outcomes(outcomes).await;
    }

    async fn probe(&self, name: String, address: String) -> ProbeOutcome {
        let url = format!("{}{}", address.trim_end_matches('/'), self.config.path);
        let timeout = Duration::from_secs(self.config.timeout_secs);

        let result = match self.client.get(&url).timeout(timeout).send().await {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => {
                tracing::warn!(
                    service = %name,
                    status = %response.status(),
                    "Probe failed: non-success status"
                );
                Err(format!("non-success status {}", response.status()))
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(service = %name, "Probe failed: timeout");
                Err(format!("probe timed out after {}s", self.config.timeout_secs))
            }
            Err(e) => {
                tracing::warn!(service = %name, error = %e, "Probe failed: connection error");
                Err(format!("connection error: {}", e))
            }
        };

        ProbeOutcome { name, result }
    }
}
