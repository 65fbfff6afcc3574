//! End-to-end tests for the chat endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use storefront_gateway::proxy::chat::{CHAT_INTERNAL_ERROR, CHAT_SERVICE_ERROR};

mod common;

async fn gateway_with_chat(chat: Router) -> common::Gateway {
    let chat = common::start_upstream(chat).await;
    let services = common::start_upstream(common::service_upstream()).await;
    common::start_gateway(common::gateway_config(services, chat)).await
}

#[tokio::test]
async fn successful_answer_is_relayed() {
    let chat = Router::new().route(
        "/chat",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body, json!({ "question": "hi" }));
            Json(json!({ "answer": "hello" }))
        }),
    );
    let gateway = gateway_with_chat(chat).await;

    let res = common::client()
        .post(gateway.url("/api/chat"))
        .json(&json!({ "question": "hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "answer": "hello" }));
}

#[tokio::test]
async fn upstream_failure_text_is_not_leaked() {
    let chat = Router::new().route(
        "/chat",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "\"overloaded\"") }),
    );
    let gateway = gateway_with_chat(chat).await;

    let res = common::client()
        .post(gateway.url("/api/chat"))
        .json(&json!({ "question": "hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    let text = res.text().await.unwrap();
    assert!(!text.contains("overloaded"));
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body, json!({ "error": CHAT_SERVICE_ERROR }));
    assert_eq!(body, json!({ "error": "Error en el servicio de chat" }));
}

#[tokio::test]
async fn malformed_body_is_internal_error() {
    let chat = Router::new().route("/chat", post(|| async { StatusCode::IM_A_TEAPOT }));
    let gateway = gateway_with_chat(chat).await;

    let res = common::client()
        .post(gateway.url("/api/chat"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": CHAT_INTERNAL_ERROR }));
}

#[tokio::test]
async fn only_cookies_are_forwarded() {
    let seen: Arc<Mutex<Option<(HeaderMap, Bytes)>>> = Arc::new(Mutex::new(None));
    let captured = seen.clone();
    let chat = Router::new().route(
        "/chat",
        post(move |headers: HeaderMap, body: Bytes| {
            let captured = captured.clone();
            async move {
                *captured.lock().unwrap() = Some((headers, body));
                Json(json!({ "answer": "ok" })).into_response()
            }
        }),
    );
    let gateway = gateway_with_chat(chat).await;

    let res = common::client()
        .post(gateway.url("/api/chat"))
        .header("cookie", "session=abc")
        .header("cookie", "lang=es")
        .header("accept-language", "es-ES")
        .header("authorization", "Bearer t")
        .header("content-type", "text/plain")
        .body(r#"{ "question" : "¿hola?",  "history": [] }"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let (headers, body) = seen.lock().unwrap().take().expect("chat service was called");
    assert_eq!(headers.get("cookie").unwrap(), "session=abc; lang=es");
    assert_eq!(headers.get("content-type").unwrap(), "application/json");
    assert!(headers.get("accept-language").is_none());
    assert!(headers.get("authorization").is_none());
    assert!(headers.get("x-request-id").is_none());

    let forwarded: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(forwarded, json!({ "question": "¿hola?", "history": [] }));
    let text = std::str::from_utf8(&body).unwrap();
    assert!(!text.contains(' '), "re-encoded compactly: {}", text);
}

#[tokio::test]
async fn unreachable_chat_service_is_internal_error() {
    let services = common::start_upstream(common::service_upstream()).await;
    let chat = common::unreachable_addr().await;
    let gateway = common::start_gateway(common::gateway_config(services, chat)).await;

    let res = common::client()
        .post(gateway.url("/api/chat"))
        .json(&json!({ "question": "hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": CHAT_INTERNAL_ERROR }));
}

#[tokio::test]
async fn non_json_success_is_internal_error() {
    let chat = Router::new().route("/chat", post(|| async { "plain text" }));
    let gateway = gateway_with_chat(chat).await;

    let res = common::client()
        .post(gateway.url("/api/chat"))
        .json(&json!({ "question": "hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
}
