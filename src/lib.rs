//! In-memory service registry with health probing and per-service circuit
//! breaking.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │               SERVICE REGISTRY                 │
//!                    │                                               │
//!   register /       │  ┌─────────┐      ┌─────────────────────┐    │
//!   resolve /        │  │  http   │─────▶│      registry        │    │
//!   report ──────────┼─▶│ facade  │      │  (table + breakers)  │    │
//!                    │  └─────────┘      └──────┬───────▲───────┘    │
//!                    │                          │       │            │
//!                    │                   ┌──────▼───┐ ┌─┴────────┐   │
//!   GET /health ◀────┼───────────────────│  health  │ │resilience│   │
//!   on each service  │                   │  prober  │ │ breaker  │   │
//!                    │                   └──────┬───┘ └──────────┘   │
//!                    │                          │                    │
//!                    │                   ┌──────▼───┐                │
//!                    │                   │ snapshot │  (best-effort  │
//!                    │                   │  store   │   JSON file)   │
//!                    │                   └──────────┘                │
//!                    └───────────────────────────────────────────────┘
//! ```
//!
//! Callers register on startup, resolve before each outbound call, and
//! report the call's outcome afterwards; the breaker, not the advisory
//! health status, decides whether a resolve is admitted.

// Core subsystems
pub mod config;
pub mod registry;
pub mod resilience;
pub mod snapshot;

// Traffic management
pub mod health;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;

pub use config::RegistryConfig;
pub use http::ApiServer;
pub use lifecycle::Shutdown;
pub use registry::core::ServiceRegistry;
pub use registry::types::{RegistryError, ServiceEntry, ServiceMetadata, ServiceStatus};
