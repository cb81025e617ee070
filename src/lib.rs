//! DiagnosKit: request observability for axum services.
//!
//! Attaches correlation tracking, structured log enrichment, request metrics
//! and uniform error responses to an application router, and resolves the
//! monthly index name used to ship logs to a search backend.

pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod shipping;

pub use config::schema::DiagnosKitConfig;
pub use errors::{DiagnosticError, FailureKind};
pub use http::{instrument, CallerIdentity, HttpServer, ObservabilityState, RequestContext};
pub use observability::MetricsRecorder;
