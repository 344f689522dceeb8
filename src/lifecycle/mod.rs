//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Build registry (restore snapshot) → Start prober → Serve facade
//!
//! Shutdown:
//!     Signal received → Broadcast → Prober finishes current sweep → Final snapshot → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: stop the prober, then flush the snapshot
//! - shutdown() is idempotent; repeated calls are no-ops

pub mod shutdown;

pub use shutdown::Shutdown;
