//! Error taxonomy for the request pipeline.
//!
//! Every failure a request can hit maps to exactly one terminal JSON response.
//! Internal causes are logged server-side and never echoed to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Terminal failure states for a request.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// Client identity is on the block list (permanent until restart).
    #[error("client is blocked")]
    ClientBlocked,

    /// Sliding-window rate limit exceeded (transient).
    #[error("rate limit exceeded")]
    RateLimited,

    /// A submitted field failed validation. The message is safe to echo.
    #[error("{0}")]
    MalformedInput(&'static str),

    /// CSRF token missing, mismatched, or expired.
    #[error("csrf validation failed")]
    CsrfMismatch,

    /// Suspicious request content; the client has been block-listed.
    #[error("suspicious request content")]
    SuspiciousRequest,

    /// Request body exceeded the configured size limit.
    #[error("request body too large")]
    PayloadTooLarge,

    /// Anything unexpected inside the pipeline.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SecurityError {
    pub fn status(&self) -> StatusCode {
        match self {
            SecurityError::ClientBlocked => StatusCode::FORBIDDEN,
            SecurityError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            SecurityError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            SecurityError::CsrfMismatch => StatusCode::FORBIDDEN,
            SecurityError::SuspiciousRequest => StatusCode::BAD_REQUEST,
            SecurityError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            SecurityError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal causes are deliberately generic.
    pub fn client_message(&self) -> &str {
        match self {
            SecurityError::ClientBlocked => "Access forbidden",
            SecurityError::RateLimited => "Too many requests. Please try again later.",
            SecurityError::MalformedInput(msg) => msg,
            SecurityError::CsrfMismatch => "Invalid request",
            SecurityError::SuspiciousRequest => "Bad request",
            SecurityError::PayloadTooLarge => "Request payload too large",
            SecurityError::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for SecurityError {
    fn into_response(self) -> Response {
        if let SecurityError::Internal(cause) = &self {
            tracing::error!(%cause, "internal error in request pipeline");
        }
        let body = json!({ "error": self.client_message() });
        (self.status(), Json(body)).into_response()
    }
}
