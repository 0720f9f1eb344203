//! Swatch REST API Server
//!
//! Serves the material catalog over HTTP. See the `swatch_api` library docs
//! for the endpoint list.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swatch_api::{rate_limited_router, ApiConfig, AppState};

/// Swatch API Server
#[derive(Parser, Debug)]
#[command(name = "swatch-api", version, about = "REST API for the swatch material catalog")]
struct Cli {
    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to bind to
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// Store location: `sqlite://path`, a bare path, or `:memory:`
    #[arg(short = 'd', long, env = "DATABASE_URL", default_value = "swatch.db")]
    database_url: String,

    /// Allowed CORS origin (repeatable; defaults to http://localhost:<port>)
    #[arg(long = "cors-origin", env = "CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    /// Sustained requests per second per client IP
    #[arg(long, env = "RATE_LIMIT_PER_SECOND", default_value_t = 50)]
    rate_limit_per_second: u32,

    /// Burst size per client IP
    #[arg(long, env = "RATE_LIMIT_BURST", default_value_t = 100)]
    rate_limit_burst: u32,

    /// Requests in flight at once, across all routes
    #[arg(long, env = "MAX_IN_FLIGHT", default_value_t = 100)]
    max_in_flight: usize,
}

impl From<Cli> for ApiConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            database_url: cli.database_url,
            cors_origins: cli.cors_origins,
            request_timeout_secs: cli.request_timeout_secs,
            rate_limit_per_second: cli.rate_limit_per_second,
            rate_limit_burst: cli.rate_limit_burst,
            max_in_flight: cli.max_in_flight,
        }
    }
}

/// Graceful shutdown signal handler.
/// Listens for SIGINT (Ctrl+C) and SIGTERM (container stop).
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
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swatch_api=info,swatch=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from(Cli::parse());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Starting Swatch API server");
    tracing::info!(database_url = %config.database_url, "Opening material store");
    tracing::info!(origins = ?config.allowed_origins(), "CORS origins");
    tracing::info!(
        "Rate limiting: {} req/sec sustained, {} burst",
        config.rate_limit_per_second,
        config.rate_limit_burst
    );
    tracing::info!("Concurrency limit: {} in-flight requests", config.max_in_flight);

    let state = Arc::new(AppState::open(config)?);
    let app = rate_limited_router(state)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("OpenAPI document at http://{}/api-docs/openapi.json", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
