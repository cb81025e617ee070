//! Error response rendering.
//!
//! # Responsibilities
//! - Turn an unhandled [`DiagnosticError`] into the uniform JSON error body
//! - Log the full failure detail at error severity (never in the body)
//! - Echo the correlation id on the response
//!
//! Rendering never fails: if the body cannot be serialized a fixed minimal
//! body is returned instead.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::Instrument;

use crate::errors::{classify, DiagnosticError, Fault, GENERIC_ERROR_MESSAGE};
use crate::http::context::{endpoint_tag, RequestContext};
use crate::http::correlation;
use crate::observability::MetricsRecorder;

/// Body written when the error body itself cannot be produced.
pub fn fallback_body(correlation_id: &str) -> String {
    // `Value`'s Display quotes and escapes the id and cannot fail.
    format!(
        r#"{{"statusCode":500,"correlationId":{},"message":"{GENERIC_ERROR_MESSAGE}"}}"#,
        serde_json::Value::from(correlation_id)
    )
}

/// JSON error body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody<'a> {
    pub status_code: u16,
    pub correlation_id: &'a str,
    pub message: &'a str,
}

/// Render the error response for `error`.
///
/// Expects to run inside the request span of `ctx`.
pub fn render_error(ctx: &RequestContext, error: &DiagnosticError) -> Response {
    let classified = classify(error, ctx.correlation_id.as_str());
    let status = classified.status;

    tracing::error!(
        StatusCode = status.as_u16(),
        kind = ?error.kind(),
        error = %error,
        detail = ?error,
        "An error occurred"
    );

    let body = ErrorBody {
        status_code: status.as_u16(),
        correlation_id: ctx.correlation_id.as_str(),
        message: &classified.user_message,
    };

    let mut response = match serde_json::to_vec(&body) {
        Ok(bytes) => json_response(status, Body::from(bytes)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize error body");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Body::from(fallback_body(ctx.correlation_id.as_str())),
            )
        }
    };

    correlation::propagate(response.headers_mut(), &ctx.correlation_id);
    response
}

fn json_response(status: StatusCode, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// Response used by the catch-panic layer: a panic is an unclassified fault.
pub fn panic_response(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    DiagnosticError::unclassified(format!("handler panicked: {detail}")).into_response()
}

/// Middleware rendering faults without the full observability pipeline.
///
/// If an outer observability middleware already established a
/// [`RequestContext`], the context is reused and the request and its failure
/// are left for that middleware to count. Otherwise a context is resolved
/// here, the request is counted, and a fault is logged inside the context
/// span and counted as a failure.
pub async fn unified_error_handler(
    State(metrics): State<Arc<MetricsRecorder>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let outer_ctx = request.extensions().get::<RequestContext>().cloned();
    let ctx = match &outer_ctx {
        Some(ctx) => ctx.clone(),
        None => {
            let correlation_id = correlation::resolve(request.headers(), None);
            metrics.record_request(&endpoint_tag(&request), StatusCode::OK.as_u16());
            RequestContext::from_request(&request, correlation_id)
        }
    };

    let mut response = next.run(request).await;

    let Some(Fault(error)) = Fault::take(&mut response) else {
        return response;
    };

    if outer_ctx.is_some() {
        return render_error(&ctx, &error);
    }

    metrics.record_failure();
    let span = ctx.span();
    async { render_error(&ctx, &error) }.instrument(span).await
}
