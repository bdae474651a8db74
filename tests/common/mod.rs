//! Common test utilities and helpers
//!
//! - Lock server fixtures backed by the in-memory store and a manual clock
//! - Real TCP server for client tests
//! - Request builders and JSON body helpers

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;

use xflock::backend::locks::{ClockSource, InMemoryLockStore, LockService, ManualClock, SystemClock};
use xflock::backend::server::create_app_with;
use xflock::client::ClientConfig;
use xflock::shared::{AppConfig, LockIdentity};

pub const LEASE_SECS: u64 = 300;

/// A lock server with handles on its store and clock
pub struct TestApp {
    pub router: Router,
    pub store: InMemoryLockStore,
    pub clock: ManualClock,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn test_config(lease: Duration) -> AppConfig {
    AppConfig::builder().lease(lease).build().unwrap()
}

/// Lock server on a manual clock with the default lease
pub fn manual_app() -> TestApp {
    manual_app_with(test_config(Duration::from_secs(LEASE_SECS)))
}

pub fn manual_app_with(config: AppConfig) -> TestApp {
    let store = InMemoryLockStore::new();
    let clock = ManualClock::new(start_time());
    let router = build_router(Arc::new(store.clone()), Arc::new(clock.clone()), config);
    TestApp { router, store, clock }
}

/// Lock server on the system clock
pub fn system_app(lease: Duration) -> Router {
    build_router(
        Arc::new(InMemoryLockStore::new()),
        Arc::new(SystemClock),
        test_config(lease),
    )
}

fn build_router(
    store: Arc<InMemoryLockStore>,
    clock: Arc<dyn ClockSource>,
    config: AppConfig,
) -> Router {
    let service = LockService::new(store, clock, config.lock).unwrap();
    create_app_with(service, config)
}

/// Serve `router` on an ephemeral local port
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

pub fn client_config(addr: SocketAddr, heartbeat: Duration) -> ClientConfig {
    ClientConfig::with_builder(
        AppConfig::builder()
            .server_url(format!("http://{}", addr))
            .request_timeout(Duration::from_secs(5))
            .heartbeat_interval(heartbeat),
    )
    .unwrap()
}

pub fn alice() -> LockIdentity {
    LockIdentity::new("Alice Editor", "alice@example.com")
}

pub fn bob() -> LockIdentity {
    LockIdentity::new("Bob Writer", "bob@example.com")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub fn put(uri: &str) -> Request<Body> {
    Request::builder().method("PUT").uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Acquire request body for `requester_id`
pub fn acquire_body(requester_id: &str, identity: &LockIdentity, override_lock: bool) -> serde_json::Value {
    serde_json::json!({
        "requesterId": requester_id,
        "userEmail": identity.contact,
        "userName": identity.display_name,
        "override": override_lock,
    })
}

pub async fn body_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
