//! Request models for API calls
//!
//! Defines what callers hand to the orchestrator, and the bodies accepted by
//! the proxy surface.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ApiError;

// == HTTP Method ==
/// Methods the orchestrator knows how to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Uppercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(ApiError::UnsupportedMethod(s.to_string())),
        }
    }
}

// == Query Params ==
/// Query parameters in caller insertion order.
///
/// A value of `None` is a parameter the caller named but left undefined.
/// Inserting an existing name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(
    #[serde(deserialize_with = "scalar_values")] IndexMap<String, Option<String>>,
);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), Some(value.into()));
    }

    /// Builder form of [`QueryParams::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Names a parameter without giving it a value.
    pub fn without_value(mut self, name: impl Into<String>) -> Self {
        self.0.insert(name.into(), None);
        self
    }

    /// Value of `name`, if it was given one.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|value| value.as_deref())
    }

    /// All parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Parameters that carry a non-empty value, in insertion order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter_map(|(name, value)| match value {
            Some(value) if !value.is_empty() => Some((name, value)),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Accepts `null` (undefined), strings, booleans and numbers. Nested values
/// are rejected.
fn scalar_values<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<IndexMap<String, Option<String>>, D::Error> {
    IndexMap::<String, Value>::deserialize(deserializer)?
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                Value::Bool(b) => Some(b.to_string()),
                Value::Number(n) => Some(n.to_string()),
                other => {
                    return Err(de::Error::custom(format!(
                        "query parameter '{name}' must be a scalar, got {other}"
                    )))
                }
            };
            Ok((name, value))
        })
        .collect()
}

// == Call Options ==
/// Per-call cache and validation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallOptions {
    /// Neither read nor write the cache
    pub skip_cache: bool,
    /// Skip the filter check
    pub skip_validation: bool,
    /// TTL override in milliseconds
    #[serde(rename = "customTTL", alias = "customTtl")]
    pub custom_ttl: Option<u64>,
}

impl CallOptions {
    pub fn skip_cache() -> Self {
        Self {
            skip_cache: true,
            ..Self::default()
        }
    }

    pub fn skip_validation() -> Self {
        Self {
            skip_validation: true,
            ..Self::default()
        }
    }

    pub fn with_custom_ttl(ttl_ms: u64) -> Self {
        Self {
            custom_ttl: Some(ttl_ms),
            ..Self::default()
        }
    }
}

// == Api Request ==
/// One call through the orchestrator.
///
/// `method` stays a string until the call is made so that unsupported
/// methods are reported by the orchestrator itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    pub method: String,
    pub endpoint: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub query_params: QueryParams,
    #[serde(default)]
    pub options: CallOptions,
}

impl ApiRequest {
    pub fn new(method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            endpoint: endpoint.into(),
            data: None,
            headers: BTreeMap::new(),
            query_params: QueryParams::new(),
            options: CallOptions::default(),
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new("GET", endpoint)
    }

    pub fn post(endpoint: impl Into<String>, data: Value) -> Self {
        Self::new("POST", endpoint).with_data(data)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name, value);
        self
    }

    pub fn with_query_params(mut self, query_params: QueryParams) -> Self {
        self.query_params = query_params;
        self
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }
}

/// Body of `POST /filters/validate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateFiltersRequest {
    pub endpoint: String,
    #[serde(default)]
    pub query_params: QueryParams,
}

/// Body of `POST /cache/key`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheKeyRequest {
    pub method: String,
    pub endpoint: String,
    #[serde(default)]
    pub query_params: QueryParams,
}

/// Query string of `GET /filters`.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterQuery {
    pub endpoint: String,
}

/// Query string of `DELETE /cache`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateQuery {
    #[serde(default)]
    pub pattern: Option<String>,
}
