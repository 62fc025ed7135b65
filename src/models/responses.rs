//! Response models
//!
//! The orchestrator's response envelope and the bodies returned by the proxy
//! surface.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::filters::FilterRequirement;

// == Api Response ==
/// Response envelope returned by the orchestrator and the transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// Parsed response body
    pub data: Value,
    /// HTTP status code
    pub status: u16,
    /// Reason phrase
    pub status_text: String,
    /// Response headers
    pub headers: BTreeMap<String, String>,
    /// Set on GET responses that went through the cache path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_cache: Option<bool>,
}

impl ApiResponse {
    /// A plain `200 OK` response.
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            status: 200,
            status_text: "OK".to_string(),
            headers: BTreeMap::new(),
            from_cache: None,
        }
    }

    /// The synthetic response served on a cache hit.
    pub fn cached(data: Value) -> Self {
        Self {
            status_text: "OK (Cached)".to_string(),
            from_cache: Some(true),
            ..Self::ok(data)
        }
    }

    /// Whether the body is worth caching.
    pub fn has_body(&self) -> bool {
        match &self.data {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }
}

/// Response body for `POST /cache/key`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheKeyResponse {
    pub cache_key: String,
    pub ttl_ms: u64,
}

/// Response body for `DELETE /cache`.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// Number of entries removed
    pub removed: usize,
}

impl InvalidateResponse {
    pub fn new(pattern: Option<&str>, removed: usize) -> Self {
        let message = match pattern {
            Some(pattern) => format!("Removed {removed} entries matching '{pattern}'"),
            None => format!("Removed all {removed} entries"),
        };
        Self { message, removed }
    }
}

/// Response body for `GET /filters`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterInfoResponse {
    pub endpoint: String,
    pub requires_filters: bool,
    pub required_params: Vec<String>,
    pub optional_params: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub examples: BTreeMap<String, String>,
}

impl FilterInfoResponse {
    pub fn new(endpoint: impl Into<String>, requirement: Option<&FilterRequirement>) -> Self {
        let to_strings =
            |names: &[&str]| -> Vec<String> { names.iter().map(|n| n.to_string()).collect() };
        Self {
            endpoint: endpoint.into(),
            requires_filters: requirement.is_some(),
            required_params: requirement
                .map(|r| to_strings(r.required_params))
                .unwrap_or_default(),
            optional_params: requirement
                .map(|r| to_strings(r.optional_params))
                .unwrap_or_default(),
            description: requirement.map(|r| r.description.to_string()),
            examples: requirement
                .map(|r| {
                    r.examples
                        .iter()
                        .map(|(name, example)| (name.to_string(), example.to_string()))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
