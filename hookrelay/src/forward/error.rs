//! Error types for the webhook forwarder.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Result type alias for forwarding operations.
pub type Result<T> = std::result::Result<T, ForwardError>;

/// Terminal outcomes of a forwarding request other than a relayed response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForwardError {
    /// Token header missing, wrong, or no token configured.
    #[error("Unauthorized: invalid token")]
    Unauthorized,

    /// No downstream webhook URL configured.
    #[error("Server misconfiguration: missing webhook URL")]
    Misconfigured,

    /// The downstream call failed at the transport level.
    #[error("Forwarding error: {0}")]
    Forwarding(String),
}

impl ForwardError {
    /// HTTP status reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::Unauthorized => StatusCode::UNAUTHORIZED,
            ForwardError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ForwardError::Forwarding(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
