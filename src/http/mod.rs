//! HTTP facade subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → server.rs (router, timeout + trace layers)
//!     → handlers.rs (thin JSON adapters)
//!     → ServiceRegistry operation
//!     → JSON response (RegistryError mapped to 404 / 503)
//! ```
//!
//! # Design Decisions
//! - Handlers hold no logic; each delegates to exactly one registry operation
//! - NotFound and CircuitOpen stay distinguishable on the wire
//! - Graceful shutdown wired through the registry's shutdown signal

pub mod handlers;
pub mod server;

pub use server::ApiServer;
