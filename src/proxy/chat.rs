//! Fixed-endpoint JSON proxy for the chat service.
//!
//! Unlike the generic proxy this handler buffers and re-encodes JSON, and
//! forwards only the caller's cookies. Upstream failure text is logged, never
//! relayed.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::config::UpstreamBase;
use crate::http::request::RequestIdExt;
use crate::observability::metrics;

/// Body returned when the chat service answers with a non-success status.
pub const CHAT_SERVICE_ERROR: &str = "Error en el servicio de chat";
/// Body returned for local failures (bad JSON, unreachable service).
pub const CHAT_INTERNAL_ERROR: &str = "Error interno del servidor";

/// Chat handler state.
#[derive(Clone)]
pub struct ChatState {
    /// Fully qualified chat endpoint.
    pub endpoint: String,
    pub client: reqwest::Client,
}

impl ChatState {
    pub fn new(base: &UpstreamBase, client: reqwest::Client) -> Self {
        Self {
            endpoint: format!("{}/chat", base),
            client,
        }
    }
}

/// Collapse every inbound `Cookie` header into one `name=value; ...` string.
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let cookies: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();

    if cookies.is_empty() {
        None
    } else {
        Some(cookies.join("; "))
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// `POST /api/chat`.
pub async fn chat_handler(State(state): State<ChatState>, request: Request) -> Response {
    let start_time = Instant::now();
    let request_id = request.headers().request_id().to_string();

    let response = relay(&state, &request_id, request).await;

    metrics::record_request("chat", "POST", response.status().as_u16(), start_time);
    response
}

async fn relay(state: &ChatState, request_id: &str, request: Request) -> Response {
    let cookies = cookie_header(request.headers());

    let payload: Value = match Bytes::from_request(request, &()).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(request_id, error = %e, "Chat request body is not valid JSON");
                return error_body(StatusCode::INTERNAL_SERVER_ERROR, CHAT_INTERNAL_ERROR);
            }
        },
        Err(e) => {
            tracing::warn!(request_id, error = %e, "Failed to read chat request body");
            return error_body(StatusCode::INTERNAL_SERVER_ERROR, CHAT_INTERNAL_ERROR);
        }
    };

    let mut upstream_request = state
        .client
        .post(&state.endpoint)
        .header(header::CONTENT_TYPE, "application/json")
        .json(&payload);
    if let Some(cookies) = cookies {
        upstream_request = upstream_request.header(header::COOKIE, cookies);
    }

    let upstream = match upstream_request.send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(request_id, endpoint = %state.endpoint, error = %e, "Chat service unreachable");
            return error_body(StatusCode::INTERNAL_SERVER_ERROR, CHAT_INTERNAL_ERROR);
        }
    };

    let status = upstream.status();
    if !status.is_success() {
        let detail = upstream.text().await.unwrap_or_default();
        tracing::error!(
            request_id,
            status = status.as_u16(),
            detail = %detail,
            "Chat service returned an error"
        );
        return error_body(status, CHAT_SERVICE_ERROR);
    }

    match upstream.json::<Value>().await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            tracing::error!(request_id, error = %e, "Chat service response is not valid JSON");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, CHAT_INTERNAL_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn joins_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("session=abc"));
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; lang=es"));
        assert_eq!(
            cookie_header(&headers).as_deref(),
            Some("session=abc; theme=dark; lang=es")
        );
    }

    #[test]
    fn no_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("test"));
        assert_eq!(cookie_header(&headers), None);
    }

    #[test]
    fn endpoint_is_fixed() {
        let base = UpstreamBase::parse("http://chat.internal:5000/").unwrap();
        let state = ChatState::new(&base, reqwest::Client::new());
        assert_eq!(state.endpoint, "http://chat.internal:5000/chat");
    }
}
