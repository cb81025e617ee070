//! Per-request logging context.
//!
//! # Responsibilities
//! - Capture correlation id, caller identity and endpoint name once per request
//! - Attach them to every log record emitted while the request runs
//! - Emit exactly one completion record, even if the request is cancelled
//!
//! # Design Decisions
//! - Fields live on a `tracing` span; the request future is instrumented with
//!   it, so concurrent requests never see each other's fields
//! - Leaving the span (on any exit path) removes the fields
//! - The context is also stored in request extensions for handlers

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, StatusCode};
use tracing::Span;

use crate::http::correlation::CorrelationId;

/// Identity value used when no caller is authenticated.
pub const ANONYMOUS: &str = "anonymous";

/// Endpoint name/tag used when nothing better is known.
pub const UNKNOWN: &str = "unknown";

/// Authenticated caller, inserted as a request extension by an upstream
/// authentication layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallerIdentity(pub String);

/// Immutable context of one in-flight request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
    pub correlation_id: CorrelationId,
    pub caller_identity: String,
    pub endpoint_name: String,
}

impl RequestContext {
    pub fn new(
        correlation_id: CorrelationId,
        caller_identity: impl Into<String>,
        endpoint_name: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id,
            caller_identity: caller_identity.into(),
            endpoint_name: endpoint_name.into(),
        }
    }

    /// Build the context from what the router and auth layers have resolved.
    pub fn from_request(request: &Request<Body>, correlation_id: CorrelationId) -> Self {
        let caller_identity = request
            .extensions()
            .get::<CallerIdentity>()
            .map(|identity| identity.0.clone())
            .filter(|identity| !identity.is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string());

        let endpoint_name = request
            .extensions()
            .get::<MatchedPath>()
            .map(|path| format!("{} {}", request.method(), path.as_str()))
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self::new(correlation_id, caller_identity, endpoint_name)
    }

    /// Span carrying the context fields, child of the current span.
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "request",
            CorrelationId = %self.correlation_id,
            UserId = %self.caller_identity,
            Endpoint = %self.endpoint_name,
        )
    }
}

/// Metrics tag for a request: route pattern, else raw path, else "unknown".
pub fn endpoint_tag(request: &Request<Body>) -> String {
    if let Some(path) = request.extensions().get::<MatchedPath>() {
        return path.as_str().to_string();
    }

    let path = request.uri().path();
    if path.is_empty() {
        UNKNOWN.to_string()
    } else {
        path.to_string()
    }
}

/// Status logged when the request future is dropped before it completes.
pub const CANCELLED_STATUS: u16 = 499;

/// Emits the "Request completed" record exactly once.
///
/// Must be created inside the request span.
#[derive(Debug)]
pub struct CompletionLog {
    span: Span,
    done: bool,
}

impl CompletionLog {
    pub fn start() -> Self {
        Self {
            span: Span::current(),
            done: false,
        }
    }

    pub fn finish(mut self, status: StatusCode) {
        self.done = true;
        let _enter = self.span.enter();
        tracing::info!(StatusCode = status.as_u16(), "Request completed");
    }
}

impl Drop for CompletionLog {
    fn drop(&mut self) {
        if !self.done {
            let _enter = self.span.enter();
            tracing::info!(
                StatusCode = CANCELLED_STATUS,
                cancelled = true,
                "Request completed"
            );
        }
    }
}
