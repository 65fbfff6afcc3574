//! Generic path-forwarding proxy.
//!
//! # Flow
//! ```text
//! inbound request on a mount
//!     → method check (GET, HEAD, POST, PUT, PATCH, DELETE, OPTIONS)
//!     → target = base + resource + segments + query (dot segments → 400)
//!     → headers minus Host; body buffered unless GET/HEAD
//!     → upstream call (redirects not followed)
//!     → status copied, headers corrected, body streamed back
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Request, State},
    http::Method,
    response::{IntoResponse, Response},
};

use crate::http::request::RequestIdExt;
use crate::observability::metrics;
use crate::proxy::error::ProxyError;
use crate::proxy::headers::{client_response_headers, upstream_request_headers};
use crate::routing::ProxyMount;

/// Per-mount handler state.
#[derive(Clone)]
pub struct MountState {
    pub mount: Arc<ProxyMount>,
    pub client: reqwest::Client,
}

impl MountState {
    pub fn new(mount: ProxyMount, client: reqwest::Client) -> Self {
        Self {
            mount: Arc::new(mount),
            client,
        }
    }
}

/// Methods relayed by the proxy.
pub fn is_forwarded_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET
            | Method::HEAD
            | Method::POST
            | Method::PUT
            | Method::PATCH
            | Method::DELETE
            | Method::OPTIONS
    )
}

/// GET and HEAD never carry a body upstream.
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

/// Axum handler for every mount.
pub async fn proxy_handler(State(state): State<MountState>, request: Request) -> Response {
    let start_time = Instant::now();
    let request_id = request.headers().request_id().to_string();
    let method = request.method().clone();
    let mount = state.mount.name;

    match forward(&state, request).await {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                mount,
                method = %method,
                status = response.status().as_u16(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Upstream responded"
            );
            metrics::record_request(mount, method.as_str(), response.status().as_u16(), start_time);
            response
        }
        Err(e) => {
            match &e {
                ProxyError::UpstreamUnavailable { .. } => {
                    tracing::error!(request_id = %request_id, mount, method = %method, error = %e, "Upstream error");
                }
                _ => {
                    tracing::warn!(request_id = %request_id, mount, method = %method, error = %e, "Rejected request");
                }
            }
            metrics::record_request(mount, method.as_str(), e.status().as_u16(), start_time);
            e.into_response()
        }
    }
}

/// Forward one request to the mount's upstream and relay the response.
pub async fn forward(state: &MountState, request: Request) -> Result<Response, ProxyError> {
    let method = request.method().clone();
    if !is_forwarded_method(&method) {
        return Err(ProxyError::MethodNotAllowed(method));
    }

    let target = state.mount.target(request.uri())?;
    let headers = upstream_request_headers(request.headers());

    tracing::debug!(
        request_id = %request.headers().request_id(),
        mount = state.mount.name,
        method = %method,
        target = %target,
        "Proxying request"
    );

    let mut upstream_request = state
        .client
        .request(method.clone(), target.as_str())
        .headers(headers);

    if carries_body(&method) {
        let body = Bytes::from_request(request, &()).await?;
        upstream_request = upstream_request.body(body);
    }

    let upstream = upstream_request
        .send()
        .await
        .map_err(|source| ProxyError::UpstreamUnavailable {
            target: target.to_string(),
            source,
        })?;

    let status = upstream.status();
    let headers = client_response_headers(upstream.headers(), state.mount.corrects_response());

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
