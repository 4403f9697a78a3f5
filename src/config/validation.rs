//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate bind addresses and value ranges
//! - Detect conflicting listeners
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DispatcherConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::DispatcherConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is not a valid socket address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("http_address and https_address must differ ({0})")]
    ConflictingAddresses(String),

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("unknown log level {0:?}")]
    InvalidLogLevel(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a parsed configuration.
pub fn validate_config(config: &DispatcherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let http = parse_address("listener.http_address", &config.listener.http_address, &mut errors);

    if config.https_enabled() {
        let https = parse_address(
            "listener.https_address",
            &config.listener.https_address,
            &mut errors,
        );
        if let (Some(http), Some(https)) = (http, https) {
            // Port 0 asks the OS for a fresh port on each bind.
            if http == https && http.port() != 0 {
                errors.push(ValidationError::ConflictingAddresses(http.to_string()));
            }
        }
    }

    if let Some(tls) = &config.tls {
        if tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::Empty("tls.cert_path"));
        }
        if tls.key_path.trim().is_empty() {
            errors.push(ValidationError::Empty("tls.key_path"));
        }
    }

    if config.listener.environment.trim().is_empty() {
        errors.push(ValidationError::Empty("listener.environment"));
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroLimit("limits.max_body_size"));
    }
    if config.limits.handler_timeout_ms == 0 {
        errors.push(ValidationError::ZeroLimit("limits.handler_timeout_ms"));
    }
    if config.static_files.root.trim().is_empty() {
        errors.push(ValidationError::Empty("static_files.root"));
    }
    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn parse_address(
    field: &'static str,
    value: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<SocketAddr> {
    match value.parse() {
        Ok(addr) => Some(addr),
        Err(_) => {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}
