//! Shared utilities for integration testing.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::Request,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use storefront_gateway::config::GatewayConfig;
use storefront_gateway::http::HttpServer;
use storefront_gateway::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Serve `router` on an ephemeral loopback port.
pub async fn start_upstream(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn base_url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

/// Gateway config with every upstream pointed at `default`, chat at `chat`.
pub fn gateway_config(default: SocketAddr, chat: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstreams.auth = Some(base_url(default));
    config.upstreams.orders = Some(base_url(default));
    config.upstreams.careers = Some(base_url(default));
    config.upstreams.chat = Some(base_url(chat));
    config.timeouts.connect_secs = 2;
    config
}

/// Running gateway; shuts down on drop.
pub struct Gateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_gateway(config: GatewayConfig) -> Gateway {
    let server = HttpServer::new(config).expect("valid gateway config");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Gateway { addr, shutdown }
}

/// Client that neither follows redirects nor uses a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

/// Send `GET {path}` over a bare socket and return the whole response text.
///
/// HTTP clients normalise `.` and `..` before sending; this writes the
/// request target exactly as given.
#[allow(dead_code)]
pub async fn raw_get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

fn headers_json(headers: &HeaderMap) -> Value {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        map.entry(name.as_str().to_string())
            .or_default()
            .push(value.to_str().unwrap_or("<binary>").to_string());
    }
    json!(map)
}

/// Echo the request as JSON: method, path, query, headers, body.
async fn echo(request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let echoed = json!({
        "method": parts.method.as_str(),
        "path": parts.uri.path(),
        "query": parts.uri.query(),
        "headers": headers_json(&parts.headers),
        "body": String::from_utf8_lossy(&body),
        "body_len": body.len(),
    });
    (
        [(header::CACHE_CONTROL, "public, max-age=600")],
        Json(echoed),
    )
        .into_response()
}

async fn raw(body: Bytes) -> Response {
    ([(header::CONTENT_TYPE, "application/octet-stream")], body).into_response()
}

async fn folded_cookies() -> Response {
    let mut response = "ok".into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_static("a=1; Expires=Wed, 21 Oct 2026 07:28:00 GMT, b=2"),
    );
    response
}

async fn separate_cookies() -> Response {
    let mut response = "ok".into_response();
    let headers = response.headers_mut();
    headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1; Path=/"));
    headers.append(
        header::SET_COOKIE,
        HeaderValue::from_static("b=2, c=3; Expires=Thu, 01 Jan 2027 00:00:00 GMT"),
    );
    headers.append(header::SET_COOKIE, HeaderValue::from_static("d=4; HttpOnly"));
    response
}

async fn redirect() -> Response {
    let mut response = StatusCode::FOUND.into_response();
    response
        .headers_mut()
        .insert(header::LOCATION, HeaderValue::from_static("/login?next=%2Forders"));
    response
        .headers_mut()
        .insert(header::SET_COOKIE, HeaderValue::from_static("flash=login-required; Path=/"));
    response
}

async fn missing() -> Response {
    (StatusCode::NOT_FOUND, "order not found").into_response()
}

/// Upstream serving every resource: fixed behaviours under `*/raw`,
/// `*/cookies`, `*/many-cookies`, `*/redirect`, `*/missing`, JSON echo
/// everywhere else.
pub fn service_upstream() -> Router {
    let mut router = Router::new();
    for resource in ["/orders", "/careers", "/auth", "/users"] {
        router = router
            .route(&format!("{}/raw", resource), any(raw))
            .route(&format!("{}/cookies", resource), get(folded_cookies))
            .route(&format!("{}/many-cookies", resource), get(separate_cookies))
            .route(&format!("{}/redirect", resource), get(redirect))
            .route(&format!("{}/missing", resource), get(missing));
    }
    router.fallback(echo)
}
