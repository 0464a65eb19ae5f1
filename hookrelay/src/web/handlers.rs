//! HTTP endpoint handlers.
//!
//! Handlers stay thin: extract the request parts, delegate to the
//! [`Forwarder`] or [`Catcher`], and turn the outcome into a response.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{OriginalUri, Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::catcher::{CatchResponse, Catcher};
use crate::forward::Forwarder;

/// Shared state for the forwarder server.
#[derive(Clone)]
pub struct ForwarderState {
    pub forwarder: Arc<Forwarder>,
}

impl ForwarderState {
    pub fn new(forwarder: Forwarder) -> Self {
        Self {
            forwarder: Arc::new(forwarder),
        }
    }
}

/// Shared state for the catcher server.
#[derive(Clone)]
pub struct CatcherState {
    pub catcher: Arc<Catcher>,
}

impl CatcherState {
    pub fn new(catcher: Catcher) -> Self {
        Self {
            catcher: Arc::new(catcher),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Webhook Forwarder
// =============================================================================

/// Token gate for the forwarding route.
///
/// Runs as route middleware, before the body is read, so a bad token is a
/// 401 whatever the body size or shape.
pub async fn require_token(
    State(state): State<ForwarderState>,
    request: Request,
    next: Next,
) -> Response {
    match state.forwarder.authorize(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

/// Forwarding endpoint.
///
/// The token has already been checked by [`require_token`]. This endpoint:
/// 1. Checks a destination is configured
/// 2. Relays the raw body downstream and returns its status and body
pub async fn forward_webhook(State(state): State<ForwarderState>, body: Bytes) -> Response {
    match state.forwarder.forward(body).await {
        Ok(relayed) => relayed.into_response(),
        Err(e) => e.into_response(),
    }
}

// =============================================================================
// Request Catcher
// =============================================================================

/// Catch-all endpoint: log the request and echo what was received.
pub async fn catch_request(
    State(state): State<CatcherState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<CatchResponse> {
    Json(state.catcher.handle(&method, &uri, &headers, &body))
}
