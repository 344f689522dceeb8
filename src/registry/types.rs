//! Registry record types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Observable health of a registered service.
///
/// Advisory only: listings filter on it, but `resolve` is gated by the
/// circuit breaker, not by this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
}

/// Opaque metadata supplied at registration.
///
/// The registry interprets only `tags` (for tag-based lookup); `version` and
/// `endpoints` are informational.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceMetadata {
    pub version: Option<String>,
    pub tags: Vec<String>,
    pub endpoints: Vec<String>,
}

impl ServiceMetadata {
    /// Whether the metadata carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// The registry's record for one named service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    /// Unique identifier; the registry's primary key.
    pub name: String,

    /// Base URL the entry resolves to (e.g., "http://host:3002").
    pub address: String,

    #[serde(default)]
    pub metadata: ServiceMetadata,

    pub status: ServiceStatus,

    /// Unix-epoch seconds at registration time.
    pub registered_at: u64,

    /// Unix-epoch seconds of the most recent probe, if any.
    #[serde(default)]
    pub last_health_check: Option<u64>,

    /// Mirror of the breaker's counter, for display; the breaker is the
    /// source of truth for trip decisions.
    #[serde(default)]
    pub consecutive_failures: u32,

    /// Most recent probe failure message. Transient; not persisted.
    #[serde(skip)]
    pub last_error: Option<String>,
}

/// Caller-facing failures from registry lookups.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The name was never registered. Permanent until a future register.
    #[error("service '{0}' is not registered")]
    NotFound(String),

    /// The name is known but its circuit is open. Retryable after the
    /// breaker's open timeout.
    #[error("circuit open for service '{0}'")]
    CircuitOpen(String),
}
