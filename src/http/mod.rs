//! HTTP request observability pipeline.
//!
//! # Data Flow
//! ```text
//! Request
//!     → middleware.rs (correlation id, request span, metrics)
//!         → correlation.rs (header / generated id)
//!         → context.rs (RequestContext, completion record)
//!     → application handler
//!     → responder.rs (fault → classified JSON error body)
//!     → Response (+ X-Correlation-ID)
//! ```

pub mod context;
pub mod correlation;
pub mod middleware;
pub mod pipeline;
pub mod responder;
pub mod server;

pub use context::{CallerIdentity, RequestContext};
pub use correlation::{CorrelationId, X_CORRELATION_ID};
pub use middleware::{observability_middleware, ObservabilityState};
pub use pipeline::instrument;
pub use responder::{render_error, unified_error_handler};
pub use server::HttpServer;
