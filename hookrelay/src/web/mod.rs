//! Web server module.
//!
//! Builds the routers for both binaries:
//! - forwarder: `ANY /webhook` relays to the configured downstream URL
//! - catcher: every method on every path is logged and echoed

pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{any, get},
    Router,
};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use handlers::{
    catch_request, forward_webhook, health, require_token, CatcherState, ForwarderState,
    HealthResponse,
};

/// Path served by the forwarder.
pub const WEBHOOK_PATH: &str = "/webhook";

/// Router for the webhook forwarder.
///
/// The token check wraps only the webhook route and runs before the body
/// limit is enforced by the handler's body extraction.
pub fn forwarder_router(state: ForwarderState, max_body_bytes: usize) -> Router {
    let webhook = any(forward_webhook)
        .layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/health", get(health))
        .route(WEBHOOK_PATH, webhook)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router for the request catcher. Every request lands in the fallback.
pub fn catcher_router(state: CatcherState, max_body_bytes: usize) -> Router {
    Router::new()
        .fallback(catch_request)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create a future that completes when a shutdown signal is received.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "ctrl_c_handler_failed");
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
                tracing::error!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("server_shutting_down");
}
