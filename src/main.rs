//! DiagnosKit demo service.
//!
//! Serves a small order lookup API through the observability pipeline:
//!
//! ```text
//! GET /health          → 200 "ok"
//! GET /orders/{id}     → 200 order JSON, 400 on non-numeric id, 404 when absent
//! ```

use std::path::PathBuf;

use axum::{extract::Path, routing::get, Json, Router};
use clap::Parser;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::Instrument;

use diagnoskit::config::{load_config, DiagnosKitConfig};
use diagnoskit::observability::{logging, metrics};
use diagnoskit::shipping::{current_utc_month, SinkSettings};
use diagnoskit::{DiagnosticError, HttpServer};

#[derive(Parser, Debug)]
#[command(name = "diagnoskit", version, about = "Request observability demo service")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DiagnosKitConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;

    let service_span = logging::ServiceInfo::from_config(&config.application).span();
    serve(config).instrument(service_span).await
}

async fn serve(config: DiagnosKitConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        application = %config.application.name,
        environment = %config.application.environment,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.elasticsearch.enabled {
        let sink = SinkSettings::from_config(
            &config.elasticsearch,
            &config.application.name,
            &config.application.environment,
            &current_utc_month(),
        )?;
        tracing::info!(
            url = %sink.url,
            index = %sink.index_name,
            authenticated = sink.credentials.is_some(),
            "Log shipping configured"
        );
    }

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, demo_router());
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[derive(Serialize)]
struct Order {
    id: u64,
    item: &'static str,
    quantity: u32,
}

fn demo_router() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/orders/{id}", get(get_order))
}

async fn get_order(Path(id): Path<String>) -> Result<Json<Order>, DiagnosticError> {
    let id: u64 = id
        .parse()
        .map_err(|_| DiagnosticError::validation(format!("invalid order id {id:?}")))?;

    tracing::info!(order_id = id, "Looking up order");

    match id {
        1 => Ok(Json(Order {
            id,
            item: "widget",
            quantity: 3,
        })),
        _ => Err(DiagnosticError::not_found(format!("order {id} not found"))),
    }
}
