//! Circuit breaker for registered service protection.
//!
//! # States
//! - Closed: normal operation, lookups pass through
//! - Open: service assumed down, lookups fail fast
//! - Half-Open: testing if the service recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= threshold
//! Open → Half-Open: first lookup after the open timeout elapsed
//! Half-Open → Closed: trial call succeeds
//! Half-Open → Open: trial call fails
//! ```
//!
//! No I/O and no internal clock: every transition that depends on time takes
//! `now` as a parameter, so callers (and tests) control it.

use std::time::{Duration, Instant};

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// Per-service failure-counting state machine.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: BreakerState,
    failure_count: u32,
    failure_threshold: u32,
    open_timeout: Duration,
    last_failure_at: Option<Instant>,
}

impl CircuitBreaker {
    /// Create a new breaker in the Closed state.
    pub fn new(failure_threshold: u32, open_timeout: Duration) -> Self {
        Self {
            state: BreakerState::Closed,
            failure_count: 0,
            failure_threshold,
            open_timeout,
            last_failure_at: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> BreakerState {
        self.state
    }

    /// Consecutive failures recorded since the last reset.
    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// Lookup-time gate.
    ///
    /// Returns `true` when a call to the service is allowed. An Open breaker
    /// whose timeout has elapsed transitions to Half-Open and admits the
    /// caller as the trial.
    pub fn allow_request(&mut self, now: Instant) -> bool {
        match self.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                let elapsed_enough = self
                    .last_failure_at
                    .map(|at| now.duration_since(at) >= self.open_timeout)
                    .unwrap_or(true);
                if elapsed_enough {
                    self.state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful call.
    pub fn record_success(&mut self) {
        match self.state {
            BreakerState::Closed => {
                self.failure_count = 0;
            }
            BreakerState::HalfOpen => {
                self.state = BreakerState::Closed;
                self.failure_count = 0;
            }
            // Only the half-open trial closes an open breaker.
            BreakerState::Open => {}
        }
    }

    /// Record a failed call.
    pub fn record_failure(&mut self, now: Instant) {
        match self.state {
            BreakerState::Closed => {
                self.failure_count += 1;
                if self.failure_count >= self.failure_threshold {
                    self.state = BreakerState::Open;
                    self.last_failure_at = Some(now);
                }
            }
            BreakerState::HalfOpen => {
                self.state = BreakerState::Open;
                self.last_failure_at = Some(now);
            }
            // Failures reported while open extend the timeout window.
            BreakerState::Open => {
                self.last_failure_at = Some(now);
            }
        }
    }
}
