//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Caller resolves a service:
//!     → breaker.rs (gate the lookup; open circuits fail fast)
//! Caller reports an outcome / prober finishes a probe:
//!     → breaker.rs (track failures, open circuit if threshold exceeded)
//! ```
//!
//! # Design Decisions
//! - Per-service circuit breaker (not global)
//! - Fail fast in Open state; no waiting on timeouts at lookup time
//! - Single trial in Half-Open (prevents hammering a recovering service)
//! - The breaker is a pure state machine; the clock is passed in

pub mod breaker;
