//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the listening port and every backend address
//! - Reject an empty backend list
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid listener port '{0}'")]
    InvalidPort(String),

    #[error("no backends configured")]
    NoBackends,

    #[error("backend {index}: invalid address '{address}': {reason}")]
    InvalidBackendAddress {
        index: usize,
        address: String,
        reason: String,
    },

    #[error("backend {index}: unsupported scheme '{scheme}' in '{address}' (expected http or https)")]
    UnsupportedScheme {
        index: usize,
        address: String,
        scheme: String,
    },

    #[error("invalid log level '{level}': {reason}")]
    InvalidLogLevel { level: String, reason: String },
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port.parse::<u16>().is_err() {
        errors.push(ValidationError::InvalidPort(config.listener.port.clone()));
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }

    for (index, backend) in config.backends.iter().enumerate() {
        if let Err(e) = check_backend_address(index, &backend.address) {
            errors.push(e);
        }
    }

    if let Err(e) = tracing_subscriber::EnvFilter::try_new(&config.logging.level) {
        errors.push(ValidationError::InvalidLogLevel {
            level: config.logging.level.clone(),
            reason: e.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_backend_address(index: usize, address: &str) -> Result<(), ValidationError> {
    let url = Url::parse(address).map_err(|e| ValidationError::InvalidBackendAddress {
        index,
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ValidationError::UnsupportedScheme {
                index,
                address: address.to_string(),
                scheme: scheme.to_string(),
            })
        }
    }

    if url.host_str().is_none() {
        return Err(ValidationError::InvalidBackendAddress {
            index,
            address: address.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(())
}
