//! Health probing subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic timer (prober.rs):
//!     → collect (name, address) targets from the registry
//!     → probe all targets concurrently, each with its own timeout
//!     → feed outcomes back: entry status + breaker + snapshot
//! ```
//!
//! # Design Decisions
//! - Probes run outside the table lock; outcomes are applied in one batch
//! - Every probe is independently time-bounded; one hung service cannot
//!   stall the sweep
//! - Probe errors surface only as status/breaker transitions, never to
//!   resolve() callers

pub mod prober;
