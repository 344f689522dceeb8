//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files, with
//! defaults on every field so a minimal (or absent) config still runs.

use serde::{Deserialize, Serialize};

/// Root configuration for the service registry.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RegistryConfig {
    /// HTTP facade listener settings.
    pub listener: ListenerConfig,

    /// Per-service circuit breaker settings.
    pub breaker: BreakerConfig,

    /// Periodic health probe settings.
    pub health_check: HealthCheckConfig,

    /// Snapshot file settings.
    pub snapshot: SnapshotConfig,
}

/// Listener configuration for the HTTP facade.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8500").
    pub bind_address: String,

    /// Per-request timeout for facade calls, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8500".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Circuit breaker configuration, shared by every per-service breaker.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,

    /// Seconds an open circuit waits before allowing a half-open trial.
    pub open_timeout_secs: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            open_timeout_secs: default_open_timeout_secs(),
        }
    }
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_open_timeout_secs() -> u64 {
    60
}

/// Health probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the periodic prober.
    pub enabled: bool,

    /// Seconds between probe sweeps.
    pub interval_secs: u64,

    /// Per-probe timeout in seconds. A hanging service must not stall the sweep.
    pub timeout_secs: u64,

    /// Well-known liveness path on each service's address.
    pub path: String,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            timeout_secs: 5,
            path: "/health".to_string(),
        }
    }
}

/// Snapshot file configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Path of the JSON snapshot file.
    pub path: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: "registry-snapshot.json".to_string(),
        }
    }
}
