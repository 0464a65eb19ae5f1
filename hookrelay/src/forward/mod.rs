//! Token-gated webhook forwarding.
//!
//! A forwarding request goes through three gates in order:
//! 1. The `x-webhook-token` header must equal the configured secret
//! 2. A downstream webhook URL must be configured
//! 3. The raw body is POSTed downstream exactly once
//!
//! The downstream status and body are relayed back unchanged. The body is
//! never parsed or rewritten on either leg.

pub mod error;

use std::error::Error as StdError;
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use reqwest::Client;
use tracing::{info, warn};

use crate::Config;

pub use error::{ForwardError, Result};

/// Header carrying the caller's shared secret.
pub const TOKEN_HEADER: &str = "x-webhook-token";

/// Downstream response relayed verbatim to the caller.
#[derive(Debug, Clone)]
pub struct Relayed {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        // Bytes defaults to octet-stream; report what the downstream sent.
        match self.content_type {
            Some(ct) => {
                response.headers_mut().insert(header::CONTENT_TYPE, ct);
            }
            None => {
                response.headers_mut().remove(header::CONTENT_TYPE);
            }
        }
        response
    }
}

/// Forwards authorized request bodies to a single downstream webhook.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    destination: Option<String>,
    token: Option<String>,
}

impl Forwarder {
    /// Build a forwarder with an explicit destination and token.
    pub fn new(client: Client, destination: Option<String>, token: Option<String>) -> Self {
        Self {
            client,
            destination,
            token,
        }
    }

    /// Build a forwarder from the resolved configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(ms) = config.forward_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder.build()?;

        Ok(Self::new(
            client,
            config.webhook_url.clone(),
            config.webhook_token.clone(),
        ))
    }

    /// Check the caller's token against the configured secret.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<()> {
        let provided = headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        match self.token.as_deref() {
            Some(expected) if constant_time_compare(provided, expected) => Ok(()),
            Some(_) => {
                warn!(token_present = !provided.is_empty(), "forward_token_invalid");
                Err(ForwardError::Unauthorized)
            }
            None => {
                warn!("forward_token_not_configured");
                Err(ForwardError::Unauthorized)
            }
        }
    }

    /// Authorize the request and relay its body downstream.
    pub async fn handle(&self, headers: &HeaderMap, body: Bytes) -> Result<Relayed> {
        self.authorize(headers)?;
        self.forward(body).await
    }

    /// POST the body to the destination and capture the full response.
    ///
    /// Callers are expected to have authorized the request already.
    pub async fn forward(&self, body: Bytes) -> Result<Relayed> {
        let destination = self.destination.as_deref().ok_or_else(|| {
            warn!("forward_destination_not_configured");
            ForwardError::Misconfigured
        })?;

        let body_length = body.len();

        let response = self
            .client
            .post(destination)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(transport_error)?;

        info!(
            status_code = status.as_u16(),
            request_length = body_length,
            response_length = body.len(),
            "forward_complete"
        );

        Ok(Relayed {
            status,
            content_type,
            body,
        })
    }
}

/// Describe a transport failure including its underlying causes.
fn transport_error(err: reqwest::Error) -> ForwardError {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    if err.is_timeout() {
        warn!(error = %message, "forward_timeout");
    } else {
        warn!(error = %message, "forward_transport_error");
    }

    ForwardError::Forwarding(message)
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
