//! Proxy-layer error taxonomy.
//!
//! Only transport-level failures live here. Upstream application errors
//! (404, 403, ...) are ordinary responses and are relayed unchanged.

use axum::extract::rejection::BytesRejection;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::proxy::headers::NO_STORE;
use crate::routing::SegmentError;

/// Errors raised while forwarding a request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The upstream could not be reached or failed mid-request.
    #[error("upstream {target} unavailable: {source}")]
    UpstreamUnavailable {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    /// The inbound body exceeds the configured limit.
    #[error("request body exceeds the configured limit")]
    BodyTooLarge,

    /// The inbound body could not be read.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// The path cannot be mapped under the mount's resource.
    #[error("invalid request path: {0}")]
    InvalidPath(#[from] SegmentError),

    /// The method is outside the forwarded set.
    #[error("method {0} is not forwarded")]
    MethodNotAllowed(Method),
}

impl ProxyError {
    /// HTTP status returned to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::BodyRead(_) | ProxyError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Client-facing message. Upstream detail is kept for the logs.
    fn public_message(&self) -> &'static str {
        match self {
            ProxyError::UpstreamUnavailable { .. } => "Upstream request failed",
            ProxyError::BodyTooLarge => "Request body too large",
            ProxyError::BodyRead(_) => "Failed to read request body",
            ProxyError::InvalidPath(_) => "Invalid request path",
            ProxyError::MethodNotAllowed(_) => "Method not allowed",
        }
    }
}

impl From<BytesRejection> for ProxyError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ProxyError::BodyTooLarge
        } else {
            ProxyError::BodyRead(rejection.body_text())
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CACHE_CONTROL, NO_STORE)],
            self.public_message(),
        )
            .into_response()
    }
}
