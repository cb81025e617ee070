//! Failure taxonomy for request handlers.
//!
//! # Data Flow
//! ```text
//! handler returns Err(DiagnosticError)  /  handler panics
//!     → IntoResponse attaches a Fault marker to the response
//!     → observability middleware sees the marker (Faulted path)
//!     → classifier.rs maps the kind to status + safe message
//!     → http::responder renders the uniform JSON body
//! ```
//!
//! # Design Decisions
//! - Closed enum: classification is an exhaustive `match`, never type inspection
//! - The four expected kinds carry an application message that is safe to show
//! - `Unclassified` keeps its internal detail for the log only

pub mod classifier;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub use classifier::{classify, ClassifiedError, GENERIC_ERROR_MESSAGE};

/// Boxed error type used as the source of unclassified failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fieldless tag of a [`DiagnosticError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Unclassified,
}

/// A failure raised by a request handler.
#[derive(Debug, Error)]
pub enum DiagnosticError {
    /// Malformed or invalid input (400).
    #[error("{0}")]
    Validation(String),

    /// Caller is not authenticated (401).
    #[error("{0}")]
    Authentication(String),

    /// Caller is authenticated but not allowed (403).
    #[error("{0}")]
    Authorization(String),

    /// Referenced resource does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// Anything else (500). The message never reaches the caller.
    #[error("{message}")]
    Unclassified {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl DiagnosticError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::Unclassified {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an arbitrary internal error as an unclassified failure.
    pub fn internal<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unclassified {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation(_) => FailureKind::Validation,
            Self::Authentication(_) => FailureKind::Authentication,
            Self::Authorization(_) => FailureKind::Authorization,
            Self::NotFound(_) => FailureKind::NotFound,
            Self::Unclassified { .. } => FailureKind::Unclassified,
        }
    }
}

/// Response extension marking a response produced from an unhandled failure.
///
/// The pipeline removes the marker and replaces the response with the
/// rendered error body.
#[derive(Debug, Clone)]
pub struct Fault(pub Arc<DiagnosticError>);

impl Fault {
    /// Remove the fault marker from a response, if present.
    pub fn take(response: &mut Response) -> Option<Fault> {
        response.extensions_mut().remove::<Fault>()
    }
}

impl IntoResponse for DiagnosticError {
    fn into_response(self) -> Response {
        let status = self.kind().status_code();
        let mut response = status.into_response();
        response.extensions_mut().insert(Fault(Arc::new(self)));
        response
    }
}

impl From<std::io::Error> for DiagnosticError {
    fn from(error: std::io::Error) -> Self {
        Self::internal(error)
    }
}

impl From<serde_json::Error> for DiagnosticError {
    fn from(error: serde_json::Error) -> Self {
        Self::internal(error)
    }
}

impl FailureKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            FailureKind::Validation => StatusCode::BAD_REQUEST,
            FailureKind::Authentication => StatusCode::UNAUTHORIZED,
            FailureKind::Authorization => StatusCode::FORBIDDEN,
            FailureKind::NotFound => StatusCode::NOT_FOUND,
            FailureKind::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
