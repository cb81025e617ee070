//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for shipping, pretty format for development
//! - Log level from `RUST_LOG` when set, else from config
//! - Every record carries `Service`, `Environment` and `ProcessId` through the
//!   service span, which is the parent of every request span

use tracing::{Span, Subscriber};
use tracing_subscriber::fmt::{
    self,
    format::{Format, Json, JsonFields},
    MakeWriter,
};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{ApplicationConfig, ObservabilityConfig};

/// Service identity stamped on every log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub service: String,
    pub environment: String,
}

impl ServiceInfo {
    pub fn new(service: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            environment: environment.into(),
        }
    }

    pub fn from_config(config: &ApplicationConfig) -> Self {
        Self::new(&config.name, &config.environment)
    }

    /// Root span for everything the service logs.
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "service",
            Service = %self.service,
            Environment = %self.environment,
            ProcessId = std::process::id(),
        )
    }
}

/// JSON formatting layer used for shipped records.
///
/// Includes the full span list, so request records carry both the request
/// fields and the service fields.
pub fn json_layer<S, W>(writer: W) -> fmt::Layer<S, JsonFields, Format<Json>, W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_thread_ids(true)
        .with_writer(writer)
}

/// Install the global subscriber.
///
/// Returns an error if a global subscriber is already set.
pub fn init_logging(
    config: &ObservabilityConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        registry.with(json_layer(std::io::stdout)).try_init()
    } else {
        registry
            .with(fmt::layer().with_thread_ids(true))
            .try_init()
    }
}

fn default_directives(log_level: &str) -> String {
    format!("diagnoskit={log_level},tower_http={log_level},{log_level}")
}
