use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use latency_telemetry::config::{Config, LoggingConfig};
use latency_telemetry::{server, AppState};

/// Request-latency telemetry service.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.bind_address`.
    #[arg(long)]
    bind: Option<String>,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for ctrl-c");
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── 1. Configuration & logging ──────────────────────────────
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    init_tracing(&config.logging);

    // ── 2. Build shared state ───────────────────────────────────
    let state = Arc::new(AppState::new(&config.telemetry)?);
    info!(
        history_capacity = config.telemetry.history_capacity,
        excluded_paths = ?config.telemetry.excluded_paths,
        max_error_rate = config.telemetry.health.max_error_rate,
        max_avg_response_time = config.telemetry.health.max_avg_response_time,
        "telemetry registry ready"
    );

    // ── 3. Build Axum router ────────────────────────────────────
    let app = server::create_router(state);

    // ── 4. Bind & serve ─────────────────────────────────────────
    let addr = &config.server.bind_address;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(%addr, "listening");
    info!("metrics JSON → /api/metrics, health → /api/metrics/health, SSE → /api/metrics/stream");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with error")?;

    Ok(())
}
