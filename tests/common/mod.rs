//! Shared utilities for integration tests.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use storefront_gateway::{AppState, GatewayConfig, HttpServer};
use tower::ServiceExt;

pub const SHOP: &str = "https://shop.example";
pub const EVIL: &str = "https://evil.example";

/// Config whitelisting only [`SHOP`].
pub fn shop_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.cors.whitelist = vec![SHOP.to_string()];
    config
}

/// Routes standing in for the storefront API: `/echo` returns the JSON body
/// the handler received.
pub fn echo_routes() -> Router<AppState> {
    Router::new().route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
}

pub fn server(config: GatewayConfig) -> HttpServer {
    HttpServer::new(config)
        .expect("test config has a whitelist")
        .with_routes(echo_routes())
}

/// Drive one request through the full pipeline without a socket.
pub async fn send(server: &HttpServer, request: Request<Body>) -> Response<Body> {
    server.router().oneshot(request).await.unwrap()
}

pub fn post_json(origin: Option<&str>, uri: &str, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(origin) = origin {
        builder = builder.header("origin", origin);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn request(method: &str, origin: Option<&str>, uri: &str) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(origin) = origin {
        builder = builder.header("origin", origin);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
