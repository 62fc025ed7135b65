//! End-to-end tests of the caching API client against a live local upstream.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use remit_cache::{
    cache::{CacheEntry, CacheStore, MemoryStorage, SessionStorage, STORAGE_KEY},
    client::{ApiClient, ReqwestTransport},
    models::{ApiRequest, CallOptions},
    ApiError,
};
use serde_json::{json, Value};
use tokio::sync::RwLock;

// == Upstream ==

#[derive(Clone, Default)]
struct Upstream {
    hits: Arc<AtomicUsize>,
}

async fn rates(
    State(upstream): State<Upstream>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let n = upstream.hits.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({
        "country": query.get("receiving_country_code"),
        "rate": 278.5,
        "served": n
    }))
}

async fn token(State(upstream): State<Upstream>) -> Json<Value> {
    upstream.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({"access_token": "abc", "expires_in": 300}))
}

async fn empty(State(upstream): State<Upstream>) -> StatusCode {
    upstream.hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::NO_CONTENT
}

async fn broken(State(upstream): State<Upstream>) -> (StatusCode, Json<Value>) {
    upstream.hits.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"message": "maintenance"})),
    )
}

async fn spawn_upstream() -> (SocketAddr, Upstream) {
    let upstream = Upstream::default();
    let app = Router::new()
        .route("/raas/masters/v1/rates", get(rates))
        .route("/raas/v1/oauth/token", get(token).post(token))
        .route("/raas/v1/empty", get(empty))
        .route("/raas/v1/broken", get(broken))
        .with_state(upstream.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, upstream)
}

fn client_for(addr: SocketAddr, cache: CacheStore) -> ApiClient {
    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    ApiClient::new(
        format!("http://{addr}/"),
        Arc::new(RwLock::new(cache)),
        Arc::new(transport),
    )
}

fn rates_request() -> ApiRequest {
    ApiRequest::get("/raas/masters/v1/rates").with_query("receiving_country_code", "PK")
}

// == Scenarios ==

#[tokio::test]
async fn test_rates_served_from_cache_until_skipped() {
    let (addr, upstream) = spawn_upstream().await;
    let client = client_for(addr, CacheStore::default());

    let first = client.make_api_call(rates_request()).await.unwrap();
    assert_eq!(first.status, 200);
    assert_eq!(first.from_cache, Some(false));
    assert_eq!(first.data["country"], json!("PK"));
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);

    let second = client.make_api_call(rates_request()).await.unwrap();
    assert_eq!(second.from_cache, Some(true));
    assert_eq!(second.status_text, "OK (Cached)");
    assert_eq!(second.data, first.data);
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);

    let third = client
        .make_api_call(rates_request().with_options(CallOptions::skip_cache()))
        .await
        .unwrap();
    assert_eq!(third.from_cache, Some(false));
    assert_eq!(third.data["served"], json!(2));
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 2);

    let stats = client.cache().read().await.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.size, 1);
}

#[tokio::test]
async fn test_rates_cached_under_rates_ttl() {
    let (addr, _) = spawn_upstream().await;
    let storage = Arc::new(MemoryStorage::new());
    let client = client_for(addr, CacheStore::with_storage(10, 60_000, storage.clone()));

    client.make_api_call(rates_request()).await.unwrap();

    let raw = storage.get_item(STORAGE_KEY).unwrap().unwrap();
    let entries: Vec<CacheEntry> = serde_json::from_str(&raw).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].key,
        "GET:/raas/masters/v1/rates?receiving_country_code=PK"
    );
    assert_eq!(entries[0].expires_at - entries[0].timestamp, 900_000);
}

#[tokio::test]
async fn test_missing_filter_never_reaches_upstream() {
    let (addr, upstream) = spawn_upstream().await;
    let client = client_for(addr, CacheStore::default());

    let result = client
        .make_api_call(ApiRequest::get("/raas/masters/v1/rates"))
        .await;

    match result {
        Err(ApiError::Validation(message)) => {
            assert!(message.contains("receiving_country_code"));
            assert!(message.contains("/raas/masters/v1/rates"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_token_endpoint_never_cached() {
    let (addr, upstream) = spawn_upstream().await;
    let client = client_for(addr, CacheStore::default());

    for _ in 0..2 {
        let response = client
            .make_api_call(ApiRequest::get("/raas/v1/oauth/token"))
            .await
            .unwrap();
        assert_eq!(response.data["access_token"], json!("abc"));
    }

    assert_eq!(upstream.hits.load(Ordering::SeqCst), 2);
    assert!(client.cache().read().await.is_empty());
}

#[tokio::test]
async fn test_empty_body_not_cached() {
    let (addr, upstream) = spawn_upstream().await;
    let client = client_for(addr, CacheStore::default());

    for _ in 0..2 {
        let response = client
            .make_api_call(ApiRequest::get("/raas/v1/empty"))
            .await
            .unwrap();
        assert_eq!(response.status, 204);
        assert_eq!(response.data, Value::Null);
    }

    assert_eq!(upstream.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_upstream_error_status_not_cached() {
    let (addr, upstream) = spawn_upstream().await;
    let client = client_for(addr, CacheStore::default());

    for _ in 0..2 {
        let result = client
            .make_api_call(ApiRequest::get("/raas/v1/broken"))
            .await;
        match result {
            Err(ApiError::Http { status, body, .. }) => {
                assert_eq!(status, 503);
                assert_eq!(body["message"], json!("maintenance"));
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    assert_eq!(upstream.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_post_token_call_passes_through_raw() {
    let (addr, _) = spawn_upstream().await;
    let client = client_for(addr, CacheStore::default());

    let response = client
        .make_api_call(ApiRequest::post(
            "/raas/v1/oauth/token",
            json!({"grant_type": "client_credentials"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.from_cache, None);
}

#[tokio::test]
async fn test_cache_survives_reload_within_session() {
    let (addr, upstream) = spawn_upstream().await;
    let storage = Arc::new(MemoryStorage::new());

    let client = client_for(addr, CacheStore::with_storage(10, 60_000, storage.clone()));
    client.make_api_call(rates_request()).await.unwrap();

    // A second client over the same session storage, as after a page reload.
    let reloaded = client_for(addr, CacheStore::with_storage(10, 60_000, storage));
    let response = reloaded.make_api_call(rates_request()).await.unwrap();

    assert_eq!(response.from_cache, Some(true));
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_custom_ttl_expires_entry() {
    let (addr, upstream) = spawn_upstream().await;
    let client = client_for(addr, CacheStore::default());
    let request = rates_request().with_options(CallOptions::with_custom_ttl(50));

    client.make_api_call(request.clone()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    let response = client.make_api_call(request).await.unwrap();

    assert_eq!(response.from_cache, Some(false));
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unreachable_upstream_is_network_error() {
    let client = ApiClient::new(
        "http://127.0.0.1:9",
        Arc::new(RwLock::new(CacheStore::default())),
        Arc::new(ReqwestTransport::new(Duration::from_secs(2)).unwrap()),
    );

    let result = tokio_test::block_on(client.make_api_call(ApiRequest::get("/raas/v1/ping")));

    assert!(matches!(result, Err(ApiError::Network(_))));
}
