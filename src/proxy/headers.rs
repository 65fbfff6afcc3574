//! Header manipulation for forwarded requests and relayed responses.
//!
//! # Responsibilities
//! - Drop `Host` from forwarded requests
//! - Leave body framing headers to the upstream client
//! - Strip hop-by-hop headers from relayed responses
//! - Apply the no-store and `Set-Cookie` corrections on proxy mounts

use axum::http::header::{self, HeaderName};
use axum::http::{HeaderMap, HeaderValue};

use crate::proxy::cookies::resplit_set_cookie;

/// Cache directive forced onto every corrected response.
pub const NO_STORE: HeaderValue = HeaderValue::from_static("no-store");

/// Request headers never copied upstream. `Host` names this server; the
/// framing headers are recomputed by the client from the forwarded body.
const REQUEST_EXCLUDED: [HeaderName; 3] = [
    header::HOST,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
];

/// Response headers that describe the upstream connection, not the message.
const RESPONSE_HOP_BY_HOP: [HeaderName; 3] = [
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    HeaderName::from_static("keep-alive"),
];

/// Copy inbound headers for the upstream request. All values of
/// multi-valued headers are kept.
pub fn upstream_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in &REQUEST_EXCLUDED {
        headers.remove(name);
    }
    headers
}

/// Copy upstream response headers for the client.
///
/// With `correct` set, `Cache-Control` is replaced by `no-store` and any
/// comma-joined `Set-Cookie` values are split into separate entries.
pub fn client_response_headers(upstream: &HeaderMap, correct: bool) -> HeaderMap {
    let mut headers = upstream.clone();
    for name in &RESPONSE_HOP_BY_HOP {
        headers.remove(name);
    }

    if correct {
        headers.insert(header::CACHE_CONTROL, NO_STORE);
        resplit_set_cookie(&mut headers);
    }

    headers
}
