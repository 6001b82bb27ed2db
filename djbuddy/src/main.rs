//! djbuddy - Mixxx session display
//!
//! Polls the Mixxx library database in the background and serves the current
//! session's tracks at `GET /api/data`, plus a display page at `/`.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use djbuddy::{build_router, AppState, Poller, PollerConfig, SnapshotStore};
use djbuddy_common::config::{Overrides, Settings, TomlConfig};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Command-line arguments for djbuddy
#[derive(Parser, Debug)]
#[command(name = "djbuddy")]
#[command(about = "Publishes the current Mixxx session for a local display")]
#[command(version)]
struct Args {
    /// Path to mixxxdb.sqlite (env DJBUDDY_DATABASE; default is the Mixxx settings folder)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "DJBUDDY_PORT")]
    port: Option<u16>,

    /// Milliseconds between poll cycles
    #[arg(long, env = "DJBUDDY_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// Milliseconds to wait after a failed poll cycle
    #[arg(long, env = "DJBUDDY_ERROR_BACKOFF_MS")]
    error_backoff_ms: Option<u64>,

    /// Config file (default: <config dir>/djbuddy/config.toml)
    #[arg(short, long, env = "DJBUDDY_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "DJBUDDY_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .init();

    // Log build identification before touching the database
    info!(
        "Starting djbuddy v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let file_config = TomlConfig::load(args.config.as_deref());
    let overrides = Overrides {
        database: args.database,
        port: args.port,
        poll_interval_ms: args.poll_interval_ms,
        error_backoff_ms: args.error_backoff_ms,
    };
    let settings = match Settings::resolve(overrides, &file_config) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Cannot start: {}", e);
            return Err(e).context("Failed to resolve configuration");
        }
    };
    info!("Database path: {}", settings.database_path.display());

    let pool = match djbuddy::db::connect_readonly(&settings.database_path).await {
        Ok(pool) => {
            info!("✓ Connected to Mixxx database (read-only)");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {:#}", e);
            return Err(e);
        }
    };

    let store = SnapshotStore::new();
    let cancel = CancellationToken::new();

    let poller = Poller::new(pool.clone(), store.clone(), PollerConfig::from(&settings));
    let poller_handle = poller.spawn(cancel.child_token());

    let app = build_router(AppState::new(store));

    // Loopback only: the display runs on the same machine as Mixxx
    let addr = SocketAddr::from(([127, 0, 0, 1], settings.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("djbuddy listening on http://{}", addr);
    info!("Track data: http://{}/api/data", addr);

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
        .await
        .context("Server error")?;

    // Server may also stop on its own; make sure the poller follows
    cancel.cancel();
    if let Err(e) = poller_handle.await {
        error!("Poller task ended abnormally: {}", e);
    }
    pool.close().await;

    info!("Shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
