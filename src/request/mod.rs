//! # Request Builder
//!
//! Turns a logical operation descriptor into an unsigned HTTP request:
//! RFC 3986 encoding for path segments and query values, a canonical
//! (sorted) query string so signing is reproducible, and a body serialized
//! exactly once so the signature covers the bytes that go on the wire.

use reqwest::Method;
use serde_json::Value;
use url::form_urlencoded;
use url::Url;

use crate::config::SessionConfig;
use crate::errors::{ClientError, ClientResult};

/// Percent-encode a path segment or query component per RFC 3986,
/// with spaces as `%20`, never `+`
pub fn urlenc(input: &str) -> String {
    form_urlencoded::byte_serialize(input.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// A logical API operation, before encoding
#[derive(Debug, Clone)]
pub struct Operation {
    pub method: Method,
    /// Resource subpath after the API version prefix, segments already
    /// percent-encoded by the caller
    pub path: String,
    /// Query parameters, raw (unencoded) keys and values
    pub params: Vec<(String, String)>,
    /// Extra headers, e.g. an explicit Authorization override
    pub headers: Vec<(String, String)>,
    /// JSON body, ignored for GET and DELETE
    pub body: Option<Value>,
}

impl Operation {
    pub fn new(method: Method, path: &str) -> Self {
        Operation {
            method,
            path: path.to_string(),
            params: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: &str) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// A fully encoded request, not yet authenticated
#[derive(Debug, Clone)]
pub struct UnsignedRequest {
    pub method: Method,
    /// Full URL including the canonical query string
    pub url: Url,
    /// Canonical (absolute, encoded) resource path, used for signing and
    /// diagnostics
    pub resource_path: String,
    /// Sorted, encoded query string; empty when there are no parameters
    pub canonical_query: String,
    pub headers: Vec<(String, String)>,
    /// Body bytes exactly as they will be transmitted
    pub body: Option<Vec<u8>>,
}

/// Build an unsigned request from an operation and a config snapshot
pub fn build(operation: &Operation, config: &SessionConfig) -> ClientResult<UnsignedRequest> {
    let full_path = config.full_path(&operation.path);

    // GET and DELETE never carry a body, even if one was supplied
    let bodyless = operation.method == Method::GET || operation.method == Method::DELETE;
    let body_value = if bodyless {
        if operation.body.is_some() {
            tracing::warn!(
                method = %operation.method,
                path = %full_path,
                "dropping request body on bodyless method"
            );
        }
        None
    } else {
        operation.body.as_ref()
    };

    let body = match body_value {
        Some(value) => Some(serde_json::to_vec(value).map_err(|e| {
            ClientError::invalid_input(&full_path, format!("unserializable body: {}", e))
        })?),
        None => None,
    };

    let canonical_query = canonical_query_string(&operation.params);

    let mut url = config.endpoint.clone();
    url.set_path(&full_path);
    if canonical_query.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&canonical_query));
    }

    let mut headers = operation.headers.clone();
    if body.is_some() {
        headers.push(("content-type".to_string(), "application/json".to_string()));
    }

    Ok(UnsignedRequest {
        method: operation.method.clone(),
        resource_path: url.path().to_string(),
        url,
        canonical_query,
        headers,
        body,
    })
}

/// Encode and sort query parameters into a canonical string.
/// Pairs are ordered by encoded key, then encoded value, so repeated keys
/// keep a deterministic order.
fn canonical_query_string(params: &[(String, String)]) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (urlenc(k), urlenc(v)))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}
