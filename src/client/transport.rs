//! HTTP transport
//!
//! The single network seam of the orchestrator. [`ReqwestTransport`] is the
//! production implementation; tests substitute their own.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::models::{ApiResponse, HttpMethod};

/// A fully built outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

// == Transport Trait ==
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the request. Non-2xx statuses are reported as
    /// [`ApiError::Http`], connection failures as [`ApiError::Network`].
    async fn send(&self, request: TransportRequest) -> Result<ApiResponse>;
}

// == Reqwest Transport ==
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Empty bodies become `null`; bodies that are not JSON are kept as a string.
fn parse_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => Value::String(text),
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<ApiResponse> {
        debug!(method = %request.method, url = %request.url, "Sending upstream request");

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("{} {}: {e}", request.method, request.url)))?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.to_string(), value.to_string()))
            })
            .collect();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response body: {e}")))?;
        let data = parse_body(text);

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                status_text,
                body: data,
            });
        }

        Ok(ApiResponse {
            data,
            status: status.as_u16(),
            status_text,
            headers,
            from_cache: None,
        })
    }
}
