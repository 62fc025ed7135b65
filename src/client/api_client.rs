//! Request orchestration
//!
//! [`ApiClient::make_api_call`] wraps the transport with filter validation
//! and the response cache.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{generate_cache_key, get_cache_ttl, CacheStore};
use crate::client::transport::{Transport, TransportRequest};
use crate::error::{ApiError, Result};
use crate::filters::validate_filters;
use crate::models::{ApiRequest, ApiResponse, HttpMethod, QueryParams};

/// Path prefix of the master-data endpoints, where a failed filter check is fatal.
pub const MASTER_DATA_NAMESPACE: &str = "/raas/masters/";

/// Fragments identifying token endpoints. These are never validated or cached.
pub const AUTH_ENDPOINT_FRAGMENTS: &[&str] = &["/oauth/token", "/oauth2/token", "/auth/token"];

pub fn is_auth_endpoint(endpoint: &str) -> bool {
    AUTH_ENDPOINT_FRAGMENTS
        .iter()
        .any(|fragment| endpoint.contains(*fragment))
}

pub fn is_master_data_endpoint(endpoint: &str) -> bool {
    endpoint.contains(MASTER_DATA_NAMESPACE)
}

// == Api Client ==
/// Issues API calls against one base URL, sharing a single cache.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    cache: Arc<RwLock<CacheStore>>,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        cache: Arc<RwLock<CacheStore>>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            cache,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The shared cache, for callers that inspect or pre-populate it directly.
    pub fn cache(&self) -> &Arc<RwLock<CacheStore>> {
        &self.cache
    }

    // == Make Api Call ==
    /// Validates, serves from cache, or calls upstream and caches the result.
    ///
    /// - GET requests to non-token endpoints are checked against their filter
    ///   requirement unless `skip_validation` is set. A failure is an error
    ///   inside [`MASTER_DATA_NAMESPACE`] and a logged warning elsewhere.
    /// - Cacheable GETs (not `skip_cache`, not a token endpoint) return a hit
    ///   without touching the network, and store non-empty successful bodies
    ///   with `custom_ttl` or the endpoint's TTL.
    /// - Other methods pass straight through to the transport.
    ///
    /// Transport errors are returned unchanged; nothing is retried.
    pub async fn make_api_call(&self, request: ApiRequest) -> Result<ApiResponse> {
        let method: HttpMethod = request.method.parse()?;
        let endpoint = request.endpoint.as_str();
        let options = request.options;
        let is_auth = is_auth_endpoint(endpoint);

        if method == HttpMethod::Get && !options.skip_validation && !is_auth {
            let result = validate_filters(endpoint, Some(&request.query_params));
            if !result.is_valid {
                let message = result.error_message.unwrap_or_default();
                if is_master_data_endpoint(endpoint) {
                    return Err(ApiError::Validation(message));
                }
                warn!(
                    endpoint,
                    missing = ?result.missing_params,
                    "Filter validation failed, continuing with request"
                );
            }
        }

        let cache_key = generate_cache_key(method, endpoint, Some(&request.query_params));
        let should_cache = method == HttpMethod::Get && !options.skip_cache && !is_auth;

        if should_cache {
            let cached = self.cache.write().await.get(&cache_key);
            if let Some(data) = cached {
                debug!(key = %cache_key, "Serving response from cache");
                return Ok(ApiResponse::cached(data));
            }
        }

        let url = self.build_url(method, endpoint, &request.query_params);
        let body = match method {
            HttpMethod::Get => None,
            _ => request.data,
        };
        let response = self
            .transport
            .send(TransportRequest {
                method,
                url,
                headers: request.headers,
                body,
            })
            .await?;

        if method != HttpMethod::Get {
            return Ok(response);
        }

        if should_cache && response.has_body() {
            let ttl = options
                .custom_ttl
                .unwrap_or_else(|| get_cache_ttl(endpoint));
            self.cache
                .write()
                .await
                .set(cache_key.as_str(), response.data.clone(), Some(ttl));
            debug!(key = %cache_key, ttl_ms = ttl, "Cached upstream response");
        }

        Ok(ApiResponse {
            from_cache: Some(false),
            ..response
        })
    }

    /// Drops cached responses whose key contains `pattern` (all when `None`).
    pub async fn invalidate(&self, pattern: Option<&str>) -> usize {
        self.cache.write().await.invalidate(pattern)
    }

    /// Base URL + endpoint, plus for GET the query string in caller order
    /// with absent and empty values dropped and values percent-encoded.
    fn build_url(&self, method: HttpMethod, endpoint: &str, query_params: &QueryParams) -> String {
        let mut url = self.base_url.clone();
        if !endpoint.starts_with('/') {
            url.push('/');
        }
        url.push_str(endpoint);

        if method != HttpMethod::Get {
            return url;
        }

        let query = query_params
            .present()
            .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }
        url
    }
}
