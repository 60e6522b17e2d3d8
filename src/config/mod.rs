//! # Endpoint & Session Configuration
//!
//! Runtime settings shared by every call: endpoint URL, API version path,
//! request timeout and the optional bearer token that overrides
//! signature-based auth. The client holds a `SessionConfig` behind an
//! atomically swapped snapshot, so configuration changes take effect on
//! the next call only and never tear an in-flight request.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::Value;
use url::Url;

use crate::errors::{ClientError, ClientResult};

/// Default backend endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.strata.dev";

/// Default API version path
pub const DEFAULT_API_PATH: &str = "/v1/";

/// Token endpoint, addressed outside the versioned API path
pub const JWT_PATH: &str = "/jwt_auth";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A bearer access token with the refresh metadata carried in its payload
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub token: String,
    /// Expiry instant from the token's `exp` claim, epoch millis
    pub expires: Option<i64>,
    /// Earliest refresh instant from the token's `refresh` claim
    pub next_refresh: Option<i64>,
}

impl AccessToken {
    /// Parse a JWT, extracting `exp` and `refresh` from its payload.
    /// The signature is not verified; only the server can do that.
    pub fn parse(token: &str) -> ClientResult<Self> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(ClientError::Configuration(
                "access token is not a valid JWT".to_string(),
            ));
        }
        let payload = URL_SAFE_NO_PAD
            .decode(parts[1])
            .map_err(|e| ClientError::Configuration(format!("bad token payload: {}", e)))?;
        let claims: Value = serde_json::from_slice(&payload)
            .map_err(|e| ClientError::Configuration(format!("bad token payload: {}", e)))?;

        Ok(AccessToken {
            token: token.to_string(),
            expires: claims.get("exp").and_then(Value::as_i64),
            next_refresh: claims.get("refresh").and_then(Value::as_i64),
        })
    }
}

/// Mutable session settings, read once per call as an immutable snapshot
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the backend, scheme + host only
    pub endpoint: Url,
    /// API version path prefix, always with a trailing slash
    pub api_path: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// When present, sent as `Authorization: Bearer` instead of a signature
    pub access_token: Option<AccessToken>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            api_path: DEFAULT_API_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
            access_token: None,
        }
    }
}

impl SessionConfig {
    /// Validate and set the endpoint URL. Requires a scheme and a host.
    pub fn set_endpoint(&mut self, endpoint: &str) -> ClientResult<()> {
        let url = Url::parse(endpoint)
            .map_err(|e| ClientError::Configuration(format!("invalid endpoint: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "endpoint scheme must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(ClientError::Configuration(
                "endpoint is missing a host".to_string(),
            ));
        }
        self.endpoint = url;
        Ok(())
    }

    /// Set the API version path, normalizing the trailing slash
    pub fn set_api_path(&mut self, path: &str) {
        let mut path = path.to_string();
        if !path.ends_with('/') {
            path.push('/');
        }
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        self.api_path = path;
    }

    /// The full resource path for an API subpath, e.g. `"cat/1"` →
    /// `"/v1/cat/1"`. Paths under the token endpoint bypass the version
    /// prefix.
    pub fn full_path(&self, resource_path: &str) -> String {
        if resource_path.starts_with(JWT_PATH) {
            return resource_path.to_string();
        }
        let resource_path = resource_path.strip_prefix('/').unwrap_or(resource_path);
        format!("{}{}", self.api_path, resource_path)
    }
}
