//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RegistryConfig (validated, immutable)
//!     → shared by clone to the registry, prober, and API server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::BreakerConfig;
pub use schema::HealthCheckConfig;
pub use schema::ListenerConfig;
pub use schema::RegistryConfig;
pub use schema::SnapshotConfig;
