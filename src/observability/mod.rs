//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP pipeline produces:
//!     → logging.rs (structured log records, request span fields)
//!     → metrics.rs (request/failure counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON), shipped to the search backend
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;

pub use metrics::{MetricsRecorder, MetricsSnapshot};
