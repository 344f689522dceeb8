//! Snapshot persistence subsystem.
//!
//! # Data Flow
//! ```text
//! Registry startup → store.rs load() → restored entries (breakers closed)
//! Mutating event  → store.rs save() → JSON file rewritten (best effort)
//! ```
//!
//! # Design Decisions
//! - Pure serialization; no registry logic lives here
//! - A missing file is an empty registry, not an error
//! - Save failures are the caller's to log and swallow

pub mod store;
