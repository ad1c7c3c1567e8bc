//! Live-socket tests: startup, real HTTP traffic and graceful shutdown.

use std::time::Duration;

use serde_json::{json, Value};
use storefront_gateway::cache::CacheError;
use storefront_gateway::lifecycle::{self, Shutdown, StartupError};
use storefront_gateway::GatewayConfig;
use tokio::net::TcpListener;

mod common;

#[tokio::test]
async fn test_serves_and_shuts_down() {
    let server = common::server(common::shop_config());
    let cache = server.state().cache.clone();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    let res = client
        .post(format!("http://{addr}/echo"))
        .header("origin", common::SHOP)
        .json(&json!({ "comment": " <b onclick=\"x()\">great</b> " }))
        .send()
        .await
        .expect("gateway unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        common::SHOP
    );
    let body: Value = res.json().await.unwrap();
    let comment = body["comment"].as_str().unwrap();
    assert!(comment.contains("great"));
    assert!(!comment.contains("onclick"));

    let res = client
        .get(format!("http://{addr}/health"))
        .header("origin", common::EVIL)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();

    assert_eq!(cache.get("anything").unwrap_err(), CacheError::Closed);
}

#[tokio::test]
async fn test_missing_whitelist_never_binds() {
    let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = probe.local_addr().unwrap();
    drop(probe);

    let mut config = GatewayConfig::default();
    config.listener.bind_address = addr.to_string();

    let err = lifecycle::start(config).await.unwrap_err();
    assert!(matches!(err, StartupError::Whitelist(_)));

    // The port is still free: startup failed before binding
    assert!(TcpListener::bind(addr).await.is_ok());
}
