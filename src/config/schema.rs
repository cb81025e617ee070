//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for a diagnoskit-instrumented service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DiagnosKitConfig {
    /// Application identity used for log enrichment and index naming.
    pub application: ApplicationConfig,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Log shipping destination.
    pub elasticsearch: ElasticSearchConfig,
}

/// Application identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Application name (e.g., "Billing.Service").
    pub name: String,

    /// Environment name (e.g., "Production", "Staging").
    pub environment: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            environment: "Production".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log records instead of human-readable lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Search backend the log records are shipped to.
///
/// Keys are accepted both in snake_case and in the PascalCase spelling
/// (`Url`, `IndexPrefix`, ...) used by existing deployments.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ElasticSearchConfig {
    /// Enable log shipping.
    pub enabled: bool,

    /// Backend URL. Required when shipping is enabled.
    #[serde(alias = "Url")]
    pub url: String,

    #[serde(alias = "Username")]
    pub username: Option<String>,

    #[serde(alias = "Password")]
    pub password: Option<String>,

    /// Prefix prepended to the index name (dots stripped, lowercased).
    #[serde(alias = "IndexPrefix")]
    pub index_prefix: Option<String>,

    /// Fixed index name; replaces the generated `{app}-{env}-{month}` base.
    #[serde(alias = "IndexFormat")]
    pub index_format: Option<String>,
}
