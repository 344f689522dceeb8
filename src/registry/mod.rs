//! Service registry subsystem.
//!
//! # Data Flow
//! ```text
//! Service startup → register() → entry added, breaker created closed
//! Health prober tick → probe outcomes → entry status + breaker updated
//! Gateway request → resolve() → entry returned, or NotFound / CircuitOpen
//! After outbound call → record_success()/record_failure() → breaker fed
//! Every mutating event → snapshot persisted (best effort)
//! ```
//!
//! # Design Decisions
//! - One RwLock guards both maps so the entry/breaker pairing mutates atomically
//! - Entry status is advisory (filters listings); only the breaker gates resolve
//! - The registry is in-memory-authoritative; the snapshot is recovery-only

pub mod core;
pub mod types;
