//! Pipeline assembly.
//!
//! Layers, inner to outer:
//! ```text
//! handler
//!     → CatchPanicLayer   (panic → unclassified fault)
//!     → TimeoutLayer      (408 on slow handlers)
//!     → observability_middleware
//!     → TraceLayer
//! ```
//!
//! Layers are applied with `Router::layer`, so the matched route is visible
//! to the middleware.

use std::time::Duration;

use axum::{middleware, Router};
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::http::middleware::{observability_middleware, ObservabilityState};
use crate::http::responder::panic_response;

/// Attach the observability pipeline to an application router.
#[allow(deprecated)]
pub fn instrument(router: Router, request_timeout: Duration, state: ObservabilityState) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn_with_state(state, observability_middleware))
        .layer(TraceLayer::new_for_http())
}
