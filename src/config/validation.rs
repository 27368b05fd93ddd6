//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (worker count, queue capacity > 0)
//! - Require the subscription coordinates (subject, queue group, servers)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::BridgeConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one server URL is required")]
    NoServers,

    #[error("subject must not be empty")]
    EmptySubject,

    #[error("queue group must not be empty")]
    EmptyQueueGroup,

    #[error("error subject must not be empty")]
    EmptyErrorSubject,

    #[error("worker count must be greater than zero")]
    NoWorkers,

    #[error("queue capacity must be greater than zero")]
    ZeroQueueCapacity,

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.transport.servers.iter().all(|s| s.trim().is_empty()) {
        errors.push(ValidationError::NoServers);
    }
    if config.transport.subject.trim().is_empty() {
        errors.push(ValidationError::EmptySubject);
    }
    if config.transport.queue_group.trim().is_empty() {
        errors.push(ValidationError::EmptyQueueGroup);
    }
    if config.transport.error_subject.trim().is_empty() {
        errors.push(ValidationError::EmptyErrorSubject);
    }
    if config.workers.count == 0 {
        errors.push(ValidationError::NoWorkers);
    }
    if config.workers.queue_capacity == 0 {
        errors.push(ValidationError::ZeroQueueCapacity);
    }
    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.transport.subject = "http".into();
        config.transport.queue_group = "workers".into();
        config
    }

    #[test]
    fn accepts_valid_config() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn default_config_needs_subscription_coordinates() {
        let errors = validate_config(&BridgeConfig::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::EmptySubject, ValidationError::EmptyQueueGroup]
        );
    }

    #[test]
    fn collects_all_errors() {
        let mut config = valid();
        config.transport.servers.clear();
        config.transport.error_subject = " ".into();
        config.workers.count = 0;
        config.workers.queue_capacity = 0;
        config.observability.metrics_address = Some("not-an-addr".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::InvalidMetricsAddress("not-an-addr".into())));
    }
}
