use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::header::{CONTENT_TYPE, USER_AGENT};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use muster_store::backend::{KvBackend, MemoryBackend};
use muster_store::key::Keyspace;
use muster_store::StoreError;
use muster_tracker::{Tracker, TrackerConfig};
use prometheus_client::registry::Registry;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::{app, ServiceState};
use crate::metrics::TrackerMetrics;

fn service_with(backend: Arc<dyn KvBackend>) -> Router {
    let tracker = Tracker::new(backend, Keyspace::default(), TrackerConfig::default());

    let mut registry = Registry::default();
    let metrics = TrackerMetrics::new(&mut registry);

    app(Arc::new(ServiceState { tracker, metrics }), registry)
}

fn service() -> Router {
    service_with(Arc::new(MemoryBackend::new()))
}

fn announce_request(community: &str, peer: &str, port: u16, ip: [u8; 4]) -> Request<Body> {
    let body = json!({
        "community_id": community,
        "peer_id": peer,
        "port": port,
    });

    let mut request = Request::builder()
        .method(Method::POST)
        .uri("/v1/announce")
        .header(CONTENT_TYPE, "application/json")
        .header(USER_AGENT, "test-agent")
        .body(Body::from(body.to_string()))
        .unwrap();

    let _ = request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 9999))));

    request
}

fn deannounce_request(community: &str, peer: &str) -> Request<Body> {
    let body = json!({
        "community_id": community,
        "peer_id": peer,
    });

    Request::builder()
        .method(Method::POST)
        .uri("/v1/deannounce")
        .header(CONTENT_TYPE, "application/json")
        .header(USER_AGENT, "test-agent")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn json_body(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn announce_lists_the_community_siblings() {
    let app = service();

    let first = app
        .clone()
        .oneshot(announce_request("ab12", "aa", 4000, [203, 0, 113, 5]))
        .await
        .unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(json_body(first).await, json!({ "ttl": 15, "peers": [] }));

    let second = app
        .oneshot(announce_request("ab12", "bb", 4001, [203, 0, 113, 6]))
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(
        json_body(second).await,
        json!({
            "ttl": 15,
            "peers": [{ "peer_id": "aa", "ip": "203.0.113.5", "port": 4000 }],
        })
    );
}

#[tokio::test]
async fn identifiers_are_canonicalized_on_the_way_in() {
    let app = service();

    let _first = app
        .clone()
        .oneshot(announce_request("AB12", "AA", 4000, [203, 0, 113, 5]))
        .await
        .unwrap();

    let second = app
        .oneshot(announce_request("ab12", "bb", 4001, [203, 0, 113, 6]))
        .await
        .unwrap();

    let body = json_body(second).await;
    assert_eq!(body["peers"][0]["peer_id"], json!("aa"));
}

#[tokio::test]
async fn deannounce_removes_the_record() {
    let app = service();

    let _first = app
        .clone()
        .oneshot(announce_request("ab12", "aa", 4000, [203, 0, 113, 5]))
        .await
        .unwrap();

    let removed = app
        .clone()
        .oneshot(deannounce_request("ab12", "aa"))
        .await
        .unwrap();

    assert_eq!(removed.status(), StatusCode::OK);
    assert_eq!(body_bytes(removed).await, b"{}");

    let second = app
        .oneshot(announce_request("ab12", "bb", 4001, [203, 0, 113, 6]))
        .await
        .unwrap();

    assert_eq!(json_body(second).await["peers"], json!([]));
}

#[tokio::test]
async fn malformed_announces_are_rejected() {
    let app = service();

    let bad_id = app
        .clone()
        .oneshot(announce_request("zz", "aa", 4000, [203, 0, 113, 5]))
        .await
        .unwrap();
    assert_eq!(bad_id.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bad_port = app
        .oneshot(announce_request("ab12", "aa", 0, [203, 0, 113, 5]))
        .await
        .unwrap();
    assert_eq!(bad_port.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn health_reports_alive() {
    let response = service().oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, br#"{"data":{"status":"alive"}}"#);
}

#[tokio::test]
async fn info_names_the_service() {
    let response = service().oneshot(get_request("/v1/info")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "name": "muster", "version": env!("CARGO_PKG_VERSION") })
    );
}

#[tokio::test]
async fn metrics_report_cardinality_and_clients() {
    let app = service();

    let _first = app
        .clone()
        .oneshot(announce_request("ab12", "aa", 4000, [203, 0, 113, 5]))
        .await
        .unwrap();

    let response = app.oneshot(get_request("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_bytes(response).await;
    let text = core::str::from_utf8(&body).unwrap();

    assert!(text.contains("muster_unique_communities 1"));
    assert!(text.contains("muster_unique_peers 1"));
    assert!(text.contains("muster_requests_by_client_total{user_agent=\"test-agent\"} 1"));
}

#[tokio::test]
async fn clients_without_a_user_agent_count_as_unknown() {
    let app = service();

    let _info = app.clone().oneshot(get_request("/v1/info")).await.unwrap();

    let response = app.oneshot(get_request("/metrics")).await.unwrap();
    let body = body_bytes(response).await;
    let text = core::str::from_utf8(&body).unwrap();

    assert!(text.contains("muster_requests_by_client_total{user_agent=\"unknown\"} 1"));
}

struct UnavailableBackend;

#[async_trait]
impl KvBackend for UnavailableBackend {
    async fn put(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_owned()))
    }

    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_owned()))
    }

    async fn get_many(&self, _keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_owned()))
    }

    async fn scan_match(
        &self,
        _cursor: u64,
        _pattern: &str,
        _count: usize,
    ) -> Result<(u64, Vec<String>), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_owned()))
    }

    async fn set_add(&self, _set: &str, _member: &[u8]) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_owned()))
    }

    async fn set_card(&self, _set: &str) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_owned()))
    }
}

#[tokio::test]
async fn backend_failures_surface_as_server_errors() {
    let app = service_with(Arc::new(UnavailableBackend));

    let response = app
        .oneshot(announce_request("ab12", "aa", 4000, [203, 0, 113, 5]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "backend unavailable: connection refused" })
    );
}
