//! hookrelay Forwarder - Token-gated webhook pass-through.
//!
//! This binary:
//! - Accepts requests on `/webhook`
//! - Verifies the `x-webhook-token` header against `WEBHOOK_TOKEN`
//! - POSTs the raw body to the configured downstream webhook
//! - Returns the downstream status and body unchanged

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use hookrelay::web::{forwarder_router, shutdown_signal, ForwarderState, WEBHOOK_PATH};
use hookrelay::{telemetry, Config, Forwarder};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();

    info!("forwarder_starting");

    let config = Config::from_env();
    info!(
        port = config.port,
        webhook_url_configured = config.webhook_url.is_some(),
        webhook_token_configured = config.webhook_token.is_some(),
        forward_timeout_ms = ?config.forward_timeout_ms,
        "config_loaded"
    );

    let forwarder = Forwarder::from_config(&config).context("Failed to create HTTP client")?;
    let app = forwarder_router(ForwarderState::new(forwarder), config.max_body_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, path = WEBHOOK_PATH, "forwarder_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("forwarder_shutdown_complete");

    Ok(())
}
