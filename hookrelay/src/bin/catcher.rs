//! hookrelay Catcher - Logs every request it receives.
//!
//! This binary:
//! - Accepts any method on any path
//! - Writes one `[timestamp] {json}` line per request to stdout
//! - Appends the same line to the request log file
//! - Echoes the captured request back as `{"ok": true, "received": ...}`

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use hookrelay::web::{catcher_router, shutdown_signal, CatcherState};
use hookrelay::{telemetry, Catcher, Config, RequestLog};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();

    info!("catcher_starting");

    let config = Config::from_env();

    let log_file = std::path::absolute(&config.request_log_file)
        .unwrap_or_else(|_| config.request_log_file.clone());

    info!(
        port = config.port,
        max_body_bytes = config.max_body_bytes,
        "config_loaded"
    );

    let catcher = Catcher::new(RequestLog::new(log_file.clone()));
    let app = catcher_router(CatcherState::new(catcher), config.max_body_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(
        address = %addr,
        port = config.port,
        log_file = %log_file.display(),
        "catcher_listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("catcher_shutdown_complete");

    Ok(())
}
