//! Semantic configuration checks, run after deserialization.

use std::fmt;

use crate::config::schema::RegistryConfig;

/// A single semantic problem found in a config.
#[derive(Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn err(field: &'static str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field,
        message: message.into(),
    }
}

/// Validate a config, collecting every problem rather than stopping at the first.
pub fn validate_config(config: &RegistryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.trim().is_empty() {
        errors.push(err("listener.bind_address", "must not be empty"));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(err("listener.request_timeout_secs", "must be at least 1"));
    }

    if config.breaker.failure_threshold == 0 {
        errors.push(err("breaker.failure_threshold", "must be at least 1"));
    }
    if config.breaker.open_timeout_secs == 0 {
        errors.push(err("breaker.open_timeout_secs", "must be at least 1"));
    }

    if config.health_check.interval_secs == 0 {
        errors.push(err("health_check.interval_secs", "must be at least 1"));
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(err("health_check.timeout_secs", "must be at least 1"));
    }
    if !config.health_check.path.starts_with('/') {
        errors.push(err("health_check.path", "must start with '/'"));
    }

    if config.snapshot.path.trim().is_empty() {
        errors.push(err("snapshot.path", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
