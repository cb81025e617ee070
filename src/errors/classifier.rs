//! Maps a failure to the status code and message the caller sees.

use axum::http::StatusCode;

use crate::errors::{DiagnosticError, FailureKind};

/// Message returned for unclassified failures. Internal detail stays in the log.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Caller-facing view of a failure.
#[derive(Debug)]
pub struct ClassifiedError<'a> {
    pub status: StatusCode,
    pub user_message: String,
    pub original: &'a DiagnosticError,
}

/// Classify a failure. Total: every failure maps to a status.
pub fn classify<'a>(error: &'a DiagnosticError, correlation_id: &str) -> ClassifiedError<'a> {
    let kind = error.kind();
    let user_message = match kind {
        FailureKind::Validation
        | FailureKind::Authentication
        | FailureKind::Authorization
        | FailureKind::NotFound => error.to_string(),
        FailureKind::Unclassified => format!(
            "{GENERIC_ERROR_MESSAGE} Reference correlation id {correlation_id} when contacting support."
        ),
    };

    ClassifiedError {
        status: kind.status_code(),
        user_message,
        original: error,
    }
}
