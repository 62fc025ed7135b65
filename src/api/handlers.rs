//! API Handlers
//!
//! HTTP request handlers for the Try It proxy and cache diagnostics.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::{info, warn};

use crate::cache::{
    generate_cache_key, get_cache_ttl, CacheStats, CacheStore, FileStorage, MemoryStorage,
    SessionStorage,
};
use crate::client::{ApiClient, ReqwestTransport};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::filters::{get_filter_requirement, validate_filters, ValidationResult};
use crate::models::{
    ApiRequest, ApiResponse, CacheKeyRequest, CacheKeyResponse, FilterInfoResponse, FilterQuery,
    HealthResponse, HttpMethod, InvalidateQuery, InvalidateResponse, ValidateFiltersRequest,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator used by the proxy
    pub client: ApiClient,
    /// File-backed session storage, when one is configured
    session_dir: Option<Arc<FileStorage>>,
}

impl AppState {
    /// Creates a new AppState around an orchestrator.
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            session_dir: None,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// The cache is restored from `cache_session_dir` when set, otherwise it
    /// lives in memory for the lifetime of the process.
    pub fn from_config(config: &Config) -> Result<Self> {
        let session_dir = match &config.cache_session_dir {
            Some(dir) => Some(Arc::new(FileStorage::open(dir).map_err(|e| {
                ApiError::Internal(format!("cannot open session dir {}: {e}", dir.display()))
            })?)),
            None => None,
        };
        let storage: Arc<dyn SessionStorage> = match &session_dir {
            Some(files) => files.clone(),
            None => Arc::new(MemoryStorage::new()),
        };

        let cache = CacheStore::with_storage(config.max_entries, config.default_ttl_ms, storage);
        let transport =
            ReqwestTransport::new(Duration::from_secs(config.request_timeout_secs))?;
        let client = ApiClient::new(
            config.api_base_url.as_str(),
            Arc::new(RwLock::new(cache)),
            Arc::new(transport),
        );

        Ok(Self {
            client,
            session_dir,
        })
    }

    /// Ends the session: file-backed storage is wiped, memory needs nothing.
    pub fn end_session(&self) {
        if let Some(files) = &self.session_dir {
            if let Err(e) = files.clear() {
                warn!(error = %e, "Failed to clear session storage");
            }
        }
    }

    /// The cache shared with the orchestrator.
    pub fn cache(&self) -> &Arc<RwLock<CacheStore>> {
        self.client.cache()
    }
}

fn require_endpoint(endpoint: &str) -> Result<()> {
    if endpoint.trim().is_empty() {
        return Err(ApiError::InvalidRequest("endpoint must not be empty".to_string()));
    }
    Ok(())
}

/// Handler for POST /try-it
///
/// Runs one call through the orchestrator.
pub async fn try_it_handler(
    State(state): State<AppState>,
    Json(req): Json<ApiRequest>,
) -> Result<Json<ApiResponse>> {
    require_endpoint(&req.endpoint)?;
    let response = state.client.make_api_call(req).await?;
    Ok(Json(response))
}

/// Handler for GET /filters?endpoint=...
///
/// Describes the filter requirement of an endpoint.
pub async fn filters_handler(Query(query): Query<FilterQuery>) -> Json<FilterInfoResponse> {
    let requirement = get_filter_requirement(&query.endpoint);
    Json(FilterInfoResponse::new(query.endpoint.as_str(), requirement))
}

/// Handler for POST /filters/validate
///
/// Always answers 200; the body says whether the filters are valid.
pub async fn validate_filters_handler(
    Json(req): Json<ValidateFiltersRequest>,
) -> Json<ValidationResult> {
    Json(validate_filters(&req.endpoint, Some(&req.query_params)))
}

/// Handler for POST /cache/key
///
/// Derives the cache key and TTL a call would use, without making it.
pub async fn cache_key_handler(Json(req): Json<CacheKeyRequest>) -> Result<Json<CacheKeyResponse>> {
    require_endpoint(&req.endpoint)?;
    let method: HttpMethod = req.method.parse()?;
    Ok(Json(CacheKeyResponse {
        cache_key: generate_cache_key(method, &req.endpoint, Some(&req.query_params)),
        ttl_ms: get_cache_ttl(&req.endpoint),
    }))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache().read().await.stats())
}

/// Handler for POST /cache/stats/reset
pub async fn reset_stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    let mut cache = state.cache().write().await;
    cache.reset_stats();
    Json(cache.stats())
}

/// Handler for DELETE /cache?pattern=...
///
/// Without a pattern every entry is removed.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Query(query): Query<InvalidateQuery>,
) -> Json<InvalidateResponse> {
    let pattern = query.pattern.as_deref();
    let removed = state.client.invalidate(pattern).await;
    info!(?pattern, removed, "Cache invalidated via API");
    Json(InvalidateResponse::new(pattern, removed))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
