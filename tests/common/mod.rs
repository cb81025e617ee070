//! Shared utilities for integration tests.

use std::io;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::Path,
    http::{Request, Response},
    middleware::{self, Next},
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;

use diagnoskit::observability::logging::json_layer;
use diagnoskit::{CallerIdentity, DiagnosticError};

/// Sample application exercising every failure kind.
pub fn sample_app() -> Router {
    Router::new()
        .route("/orders/{id}", get(get_order))
        .route("/orders", post(create_order))
        .route("/admin", get(admin))
        .route("/private", get(private))
        .route("/crash", get(crash))
        .route("/panic", get(panic_handler))
        .route("/teapot", get(teapot))
}

async fn get_order(Path(id): Path<u64>) -> Result<String, DiagnosticError> {
    if id == 1 {
        Ok("order 1".into())
    } else {
        Err(DiagnosticError::not_found(format!("order {id} not found")))
    }
}

async fn create_order() -> Result<String, DiagnosticError> {
    Err(DiagnosticError::validation("quantity must be positive"))
}

async fn admin() -> Result<String, DiagnosticError> {
    Err(DiagnosticError::authorization("admin role required"))
}

async fn private() -> Result<String, DiagnosticError> {
    Err(DiagnosticError::authentication("missing credentials"))
}

async fn crash() -> Result<String, DiagnosticError> {
    let io = std::io::Error::new(std::io::ErrorKind::Other, "db password=hunter2 rejected");
    Err(DiagnosticError::internal(io))
}

async fn panic_handler() -> &'static str {
    panic!("invariant broken: secret-token-123");
}

async fn teapot() -> (axum::http::StatusCode, &'static str) {
    (axum::http::StatusCode::IM_A_TEAPOT, "short and stout")
}

#[allow(dead_code)]
/// Outer layer that authenticates callers from the `X-User` header.
pub fn with_identity(router: Router) -> Router {
    router.layer(middleware::from_fn(identity_from_header))
}

async fn identity_from_header(mut request: Request<Body>, next: Next) -> Response<Body> {
    let user = request
        .headers()
        .get("x-user")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    if let Some(user) = user {
        request.extensions_mut().insert(CallerIdentity(user));
    }
    next.run(request).await
}

#[allow(dead_code)]
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// In-memory writer collecting JSON log records.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[allow(dead_code)]
impl Capture {
    /// Raw record lines.
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    /// Parsed records.
    pub fn records(&self) -> Vec<Value> {
        self.lines()
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

/// Route INFO and above through the shipping JSON layer into a [`Capture`]
/// for the current thread, until the guard is dropped.
#[allow(dead_code)]
pub fn capture_logs() -> (Capture, tracing::subscriber::DefaultGuard) {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(json_layer(capture.clone()));
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}

/// Fields of every span enclosing `record`, outermost first, merged.
#[allow(dead_code)]
pub fn span_fields(record: &Value) -> serde_json::Map<String, Value> {
    let mut fields = serde_json::Map::new();
    if let Some(spans) = record["spans"].as_array() {
        for span in spans {
            if let Some(span) = span.as_object() {
                fields.extend(span.clone());
            }
        }
    }
    fields
}
