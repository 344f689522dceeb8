//! The service registry: table ownership, lookups, and lifecycle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::config::RegistryConfig;
use crate::health::prober::{HealthProber, ProbeOutcome};
use crate::lifecycle::Shutdown;
use crate::registry::types::{RegistryError, ServiceEntry, ServiceMetadata, ServiceStatus};
use crate::resilience::breaker::{BreakerState, CircuitBreaker};
use crate::snapshot::store::SnapshotStore;

/// Current unix-epoch seconds.
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// The entry map and its paired breaker map, guarded together so the
/// 1:1 pairing never goes out of sync.
#[derive(Default)]
struct RegistryTable {
    entries: HashMap<String, ServiceEntry>,
    breakers: HashMap<String, CircuitBreaker>,
}

/// In-memory service registry with per-service circuit breaking.
///
/// Exclusively owns the table; collaborators hold an `Arc` and go through
/// the public operations. The snapshot store only ever sees clones.
pub struct ServiceRegistry {
    table: RwLock<RegistryTable>,
    snapshot: SnapshotStore,
    config: RegistryConfig,
    shutdown: Shutdown,
    prober_handle: Mutex<Option<JoinHandle<()>>>,
    stopped: AtomicBool,
}

impl ServiceRegistry {
    /// Build a registry, restoring any prior snapshot.
    ///
    /// Restored entries get fresh closed breakers; breaker state is never
    /// persisted. A corrupt snapshot is logged and treated as empty.
    pub async fn new(config: RegistryConfig) -> Arc<Self> {
        let snapshot = SnapshotStore::new(&config.snapshot.path);
        let restored = match snapshot.load().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, path = %config.snapshot.path, "Snapshot load failed, starting empty");
                Vec::new()
            }
        };

        let mut table = RegistryTable::default();
        for entry in restored {
            table
                .breakers
                .insert(entry.name.clone(), new_breaker(&config));
            table.entries.insert(entry.name.clone(), entry);
        }

        tracing::info!(
            services = table.entries.len(),
            snapshot = %config.snapshot.path,
            "Registry initialized"
        );

        Arc::new(Self {
            table: RwLock::new(table),
            snapshot,
            config,
            shutdown: Shutdown::new(),
            prober_handle: Mutex::new(None),
            stopped: AtomicBool::new(false),
        })
    }

    /// Spawn the periodic health prober. No-op when probing is disabled.
    pub async fn start(self: &Arc<Self>) {
        if !self.config.health_check.enabled {
            tracing::info!("Health probing disabled");
            return;
        }
        let prober = HealthProber::new(self.clone(), self.config.health_check.clone());
        let rx = self.shutdown.subscribe();
        let mut handle = self.prober_handle.lock().await;
        if handle.is_none() {
            *handle = Some(tokio::spawn(prober.run(rx)));
        }
    }

    /// Subscribe to this registry's shutdown signal.
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown.subscribe()
    }

    /// Upsert a service entry.
    ///
    /// Re-registration with the same name overwrites the prior entry and
    /// resets its breaker to closed. Idempotent under repeated identical calls.
    pub async fn register(
        &self,
        name: &str,
        address: &str,
        metadata: ServiceMetadata,
    ) -> ServiceEntry {
        let entry = ServiceEntry {
            name: name.to_string(),
            address: address.to_string(),
            metadata,
            status: ServiceStatus::Healthy,
            registered_at: unix_now(),
            last_health_check: None,
            consecutive_failures: 0,
            last_error: None,
        };

        {
            let mut table = self.table.write().await;
            let replaced = table
                .entries
                .insert(name.to_string(), entry.clone())
                .is_some();
            table.breakers.insert(name.to_string(), new_breaker(&self.config));
            if replaced {
                tracing::info!(service = %name, "Service re-registered, breaker reset");
            } else {
                tracing::info!(service = %name, address = %address, "Service registered");
            }
        }

        self.persist().await;
        entry
    }

    /// Remove a service and its breaker. Returns whether an entry existed.
    ///
    /// An unknown name leaves the table and the snapshot untouched.
    pub async fn unregister(&self, name: &str) -> bool {
        let removed = {
            let mut table = self.table.write().await;
            let removed = table.entries.remove(name).is_some();
            if removed {
                table.breakers.remove(name);
            }
            removed
        };

        if removed {
            tracing::info!(service = %name, "Service unregistered");
            self.persist().await;
        }
        removed
    }

    /// Look up a service for an outbound call.
    ///
    /// Gated by the breaker: an open circuit fails with `CircuitOpen` until
    /// its timeout elapses, at which point the next lookup flips it to
    /// half-open and is admitted as the trial. Entry status never gates this.
    pub async fn resolve(&self, name: &str) -> Result<ServiceEntry, RegistryError> {
        let mut table = self.table.write().await;
        let entry = table
            .entries
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        if let Some(breaker) = table.breakers.get_mut(name) {
            let was_open = breaker.state() == BreakerState::Open;
            if !breaker.allow_request(Instant::now()) {
                return Err(RegistryError::CircuitOpen(name.to_string()));
            }
            if was_open {
                tracing::debug!(service = %name, "Circuit half-open, admitting trial call");
            }
        }
        Ok(entry)
    }

    /// Snapshot copy of every entry.
    pub async fn list_all(&self) -> Vec<ServiceEntry> {
        let table = self.table.read().await;
        table.entries.values().cloned().collect()
    }

    /// Entries currently marked healthy.
    pub async fn list_healthy(&self) -> Vec<ServiceEntry> {
        let table = self.table.read().await;
        table
            .entries
            .values()
            .filter(|e| e.status == ServiceStatus::Healthy)
            .cloned()
            .collect()
    }

    /// Healthy entries whose metadata carries the given tag.
    pub async fn find_by_tag(&self, tag: &str) -> Vec<ServiceEntry> {
        let table = self.table.read().await;
        table
            .entries
            .values()
            .filter(|e| e.status == ServiceStatus::Healthy && e.metadata.has_tag(tag))
            .cloned()
            .collect()
    }

    /// Pick among healthy entries whose name starts with `prefix`.
    ///
    /// Time-bucketed rotation: matches are sorted by name and indexed by the
    /// current unix second mod the match count. Calls within the same second
    /// return the same pick; this is a coarse rotation, not a fair
    /// round-robin across sub-second bursts.
    pub async fn pick_by_prefix(&self, prefix: &str) -> Result<ServiceEntry, RegistryError> {
        let table = self.table.read().await;
        let mut matches: Vec<&ServiceEntry> = table
            .entries
            .values()
            .filter(|e| e.status == ServiceStatus::Healthy && e.name.starts_with(prefix))
            .collect();

        if matches.is_empty() {
            return Err(RegistryError::NotFound(prefix.to_string()));
        }

        // Sort so the pick is a function of the clock alone.
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        let index = (unix_now() as usize) % matches.len();
        Ok(matches[index].clone())
    }

    /// Report a successful outbound call. No-op for unknown names.
    pub async fn record_success(&self, name: &str) {
        {
            let mut table = self.table.write().await;
            let Some(entry) = table.entries.get_mut(name) else {
                return;
            };
            entry.status = ServiceStatus::Healthy;
            entry.consecutive_failures = 0;
            entry.last_error = None;
            if let Some(breaker) = table.breakers.get_mut(name) {
                breaker.record_success();
            }
        }
        self.persist().await;
    }

    /// Report a failed outbound call. No-op for unknown names.
    ///
    /// Bumps the entry's mirror counter and flips its status at the
    /// threshold; the authoritative trip decision lives in the breaker.
    pub async fn record_failure(&self, name: &str) {
        {
            let mut table = self.table.write().await;
            let Some(entry) = table.entries.get_mut(name) else {
                return;
            };
            entry.consecutive_failures += 1;
            if entry.consecutive_failures >= self.config.breaker.failure_threshold
                && entry.status == ServiceStatus::Healthy
            {
                entry.status = ServiceStatus::Unhealthy;
                tracing::warn!(
                    service = %name,
                    failures = entry.consecutive_failures,
                    "Service marked unhealthy after repeated failures"
                );
            }
            if let Some(breaker) = table.breakers.get_mut(name) {
                let was_open = breaker.state() == BreakerState::Open;
                breaker.record_failure(Instant::now());
                if !was_open && breaker.state() == BreakerState::Open {
                    tracing::warn!(
                        service = %name,
                        threshold = self.config.breaker.failure_threshold,
                        "Circuit opened"
                    );
                }
            }
        }
        self.persist().await;
    }

    /// (name, address) pairs for the prober's next sweep.
    pub(crate) async fn probe_targets(&self) -> Vec<(String, String)> {
        let table = self.table.read().await;
        table
            .entries
            .values()
            .map(|e| (e.name.clone(), e.address.clone()))
            .collect()
    }

    /// Apply one sweep's probe outcomes, then persist.
    pub(crate) async fn apply_probe_outcomes(&self, outcomes: Vec<ProbeOutcome>) {
        {
            let mut table = self.table.write().await;
            for outcome in outcomes {
                // The entry may have been unregistered mid-sweep.
                let Some(entry) = table.entries.get_mut(&outcome.name) else {
                    continue;
                };
                entry.last_health_check = Some(unix_now());
                match outcome.result {
                    Ok(()) => {
                        if entry.status == ServiceStatus::Unhealthy {
                            tracing::info!(service = %entry.name, "Service recovered");
                        }
                        entry.status = ServiceStatus::Healthy;
                        entry.consecutive_failures = 0;
                        entry.last_error = None;
                        if let Some(breaker) = table.breakers.get_mut(&outcome.name) {
                            breaker.record_success();
                        }
                    }
                    Err(message) => {
                        entry.status = ServiceStatus::Unhealthy;
                        entry.consecutive_failures += 1;
                        entry.last_error = Some(message);
                        if let Some(breaker) = table.breakers.get_mut(&outcome.name) {
                            breaker.record_failure(Instant::now());
                        }
                    }
                }
            }
        }
        self.persist().await;
    }

    /// Persist a snapshot of the table. Failures are logged and swallowed;
    /// the registry is in-memory-authoritative.
    async fn persist(&self) {
        let entries = self.list_all().await;
        if let Err(e) = self.snapshot.save(&entries).await {
            tracing::warn!(error = %e, "Snapshot save failed");
        }
    }

    /// Stop the prober and flush a final snapshot.
    ///
    /// Idempotent. No probe tick fires after this returns: the prober task
    /// is awaited, so the final snapshot reflects no in-flight mutation.
    pub async fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("Registry shutting down");
        self.shutdown.trigger();

        let handle = self.prober_handle.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        self.persist().await;
        tracing::info!("Registry shutdown complete");
    }
}

fn new_breaker(config: &RegistryConfig) -> CircuitBreaker {
    CircuitBreaker::new(
        config.breaker.failure_threshold,
        Duration::from_secs(config.breaker.open_timeout_secs),
    )
}
