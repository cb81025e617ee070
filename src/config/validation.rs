//! Configuration validation.
//!
//! Semantic checks that serde cannot express. Returns every error found, not
//! just the first. The shipping URL is deliberately not checked here: a missing
//! URL is reported by the index resolver when shipping starts.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::DiagnosKitConfig;

/// A single semantic configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("application.name must not be empty")]
    EmptyApplicationName,

    #[error("application.environment must not be empty")]
    EmptyEnvironment,

    #[error("{field} is not a valid socket address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &DiagnosKitConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.application.name.trim().is_empty() {
        errors.push(ValidationError::EmptyApplicationName);
    }
    if config.application.environment.trim().is_empty() {
        errors.push(ValidationError::EmptyEnvironment);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
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

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&DiagnosKitConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = DiagnosKitConfig::default();
        config.application.name = "  ".into();
        config.application.environment = String::new();
        config.observability.metrics_address = "nope".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyApplicationName,
                ValidationError::EmptyEnvironment,
                ValidationError::InvalidAddress {
                    field: "observability.metrics_address",
                    value: "nope".into(),
                },
            ]
        );
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = DiagnosKitConfig::default();
        config.observability.metrics_enabled = false;
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_shipping_url_is_not_a_validation_error() {
        let mut config = DiagnosKitConfig::default();
        config.elasticsearch.enabled = true;
        assert!(validate_config(&config).is_ok());
    }
}
