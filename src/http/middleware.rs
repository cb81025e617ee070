//! Observability middleware.
//!
//! # Request lifecycle
//! ```text
//! Start               resolve correlation id
//! ContextEstablished  open request span, store RequestContext in extensions
//! InnerInvoked        record_request(endpoint tag, 200), run inner service
//! Completed           status >= 400 → record_failure
//! Faulted             record_failure, record ("exception", 500), render error
//! Ended               completion record with StatusCode, span closed
//! ```
//!
//! Each failed request is counted once. The entry recorded before invocation
//! is kept when a fault adds the "exception" entry.
//!
//! Request spans are children of the service span, so every record also
//! carries `Service` and `Environment`.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, Span};

use crate::errors::Fault;
use crate::http::context::{endpoint_tag, CompletionLog, RequestContext};
use crate::http::correlation;
use crate::http::responder::render_error;
use crate::observability::logging::ServiceInfo;
use crate::observability::metrics::EXCEPTION_ENDPOINT;
use crate::observability::MetricsRecorder;

/// State shared by every request passing the middleware.
#[derive(Clone, Debug)]
pub struct ObservabilityState {
    pub metrics: Arc<MetricsRecorder>,
    service_span: Span,
}

impl ObservabilityState {
    pub fn new(metrics: Arc<MetricsRecorder>) -> Self {
        Self {
            metrics,
            service_span: Span::none(),
        }
    }

    /// Parent request spans under the span of `service`.
    pub fn with_service(mut self, service: &ServiceInfo) -> Self {
        self.service_span = service.span();
        self
    }

    fn request_span(&self, ctx: &RequestContext) -> Span {
        let _service = self.service_span.enter();
        ctx.span()
    }
}

impl Default for ObservabilityState {
    fn default() -> Self {
        Self::new(Arc::default())
    }
}

pub async fn observability_middleware(
    State(state): State<ObservabilityState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let correlation_id = correlation::resolve(request.headers(), None);
    let ctx = RequestContext::from_request(&request, correlation_id);
    let endpoint = endpoint_tag(&request);
    request.extensions_mut().insert(ctx.clone());

    let span = state.request_span(&ctx);
    async move {
        let completion = CompletionLog::start();

        state.metrics.record_request(&endpoint, StatusCode::OK.as_u16());
        let mut response = next.run(request).await;

        if let Some(Fault(error)) = Fault::take(&mut response) {
            state.metrics.record_failure();
            state.metrics.record_endpoint(
                EXCEPTION_ENDPOINT,
                StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            );
            response = render_error(&ctx, &error);
        } else if response.status().as_u16() >= 400 {
            state.metrics.record_failure();
        }

        correlation::propagate(response.headers_mut(), &ctx.correlation_id);
        completion.finish(response.status());
        response
    }
    .instrument(span)
    .await
}
