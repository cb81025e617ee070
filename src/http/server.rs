//! HTTP server setup.
//!
//! # Responsibilities
//! - Wrap the application router in the observability pipeline
//! - Own the shared metrics recorder
//! - Serve on a listener with graceful shutdown

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::DiagnosKitConfig;
use crate::http::middleware::ObservabilityState;
use crate::http::pipeline::instrument;
use crate::observability::logging::ServiceInfo;
use crate::observability::MetricsRecorder;

/// HTTP server serving an instrumented application router.
pub struct HttpServer {
    router: Router,
    config: DiagnosKitConfig,
    metrics: Arc<MetricsRecorder>,
}

impl HttpServer {
    /// Create a new server around `app`.
    pub fn new(config: DiagnosKitConfig, app: Router) -> Self {
        let metrics = Arc::new(MetricsRecorder::new());
        let state = ObservabilityState::new(metrics.clone())
            .with_service(&ServiceInfo::from_config(&config.application));
        let router = instrument(
            app,
            Duration::from_secs(config.timeouts.request_secs),
            state,
        );

        Self {
            router,
            config,
            metrics,
        }
    }

    /// Run until Ctrl+C / SIGTERM.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run until `shutdown` resolves.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            application = %self.config.application.name,
            environment = %self.config.application.environment,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Shared metrics recorder used by the pipeline.
    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        self.metrics.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &DiagnosKitConfig {
        &self.config
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
