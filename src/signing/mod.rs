//! # Credentials & Request Signing
//!
//! HMAC-SHA256 request authentication, structurally analogous to
//! cloud-provider signing schemes: the method, encoded path, sorted query,
//! signed headers and payload hash are canonicalized into one string, a
//! signing key is derived from the secret through a date-scoped HMAC
//! chain, and the result travels in the `Authorization` header next to a
//! timestamp header.
//!
//! Signing is a pure function of (request, credentials, timestamp), which
//! makes signatures reproducible in tests. Three auth modes exist, chosen
//! per request: a configured bearer token bypasses signing entirely, a
//! blank secret key sends the access key anonymously, otherwise the
//! request is signed.

use std::fmt;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::errors::{ClientError, ClientResult};
use crate::request::UnsignedRequest;

/// Signature scheme label, first token of the `Authorization` header
pub const SCHEME: &str = "STRATA1-HMAC-SHA256";

/// Timestamp header accompanying a signature
pub const DATE_HEADER: &str = "x-strata-date";

const SCOPE_REGION: &str = "global";
const SCOPE_SERVICE: &str = "strata";
const SCOPE_SUFFIX: &str = "strata1_request";

/// Headers covered by the signature, in canonical order
const SIGNED_HEADERS: &str = "host;x-strata-date";

type HmacSha256 = Hmac<Sha256>;

/// An access/secret key pair. Immutable after construction; the secret is
/// redacted from `Debug` output and never logged.
#[derive(Clone)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(access_key: &str, secret_key: &str) -> Self {
        Credentials {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// True when no secret is configured; requests go out unsigned with
    /// `Authorization: Anonymous <access_key>`
    pub fn is_anonymous(&self) -> bool {
        self.secret_key.is_empty()
    }
}

/// A request with its authentication headers attached. Fields are private:
/// a signed request cannot be mutated, only dispatched, so the signature
/// always covers the exact bytes transmitted.
#[derive(Debug)]
pub struct SignedRequest {
    method: reqwest::Method,
    url: url::Url,
    resource_path: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl SignedRequest {
    pub fn method(&self) -> &reqwest::Method {
        &self.method
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }

    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub(crate) fn into_body(self) -> Option<Vec<u8>> {
        self.body
    }
}

/// Attach authentication to a request, consuming it.
///
/// Mode selection: explicit `Authorization` header in the request wins,
/// then a configured bearer token, then anonymous access, then signing.
/// A blank access key is a configuration error in every mode.
pub fn authorize(
    mut request: UnsignedRequest,
    credentials: &Credentials,
    token: Option<&str>,
    timestamp: DateTime<Utc>,
) -> ClientResult<SignedRequest> {
    if credentials.access_key().is_empty() {
        return Err(ClientError::Configuration(
            "blank access key".to_string(),
        ));
    }

    let has_explicit_auth = request
        .headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("authorization"));

    if !has_explicit_auth {
        if let Some(token) = token {
            request
                .headers
                .push(("authorization".to_string(), format!("Bearer {}", token)));
        } else if credentials.is_anonymous() {
            request.headers.push((
                "authorization".to_string(),
                format!("Anonymous {}", credentials.access_key()),
            ));
        } else {
            let (date_value, auth_value) = signature_headers(&request, credentials, timestamp);
            request.headers.push((DATE_HEADER.to_string(), date_value));
            request.headers.push(("authorization".to_string(), auth_value));
        }
    }

    Ok(SignedRequest {
        method: request.method,
        url: request.url,
        resource_path: request.resource_path,
        headers: request.headers,
        body: request.body,
    })
}

/// Compute the timestamp and `Authorization` header values for a request.
/// Deterministic: identical inputs always produce identical output.
fn signature_headers(
    request: &UnsignedRequest,
    credentials: &Credentials,
    timestamp: DateTime<Utc>,
) -> (String, String) {
    let date_stamp = timestamp.format("%Y%m%d").to_string();
    let date_time = timestamp.format("%Y%m%dT%H%M%SZ").to_string();
    let host = host_with_port(&request.url);

    let payload_hash = hex_sha256(request.body.as_deref().unwrap_or_default());

    let canonical_headers = format!("host:{}\n{}:{}\n", host, DATE_HEADER, date_time);
    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method,
        request.resource_path,
        request.canonical_query,
        canonical_headers,
        SIGNED_HEADERS,
        payload_hash
    );

    let scope = format!(
        "{}/{}/{}/{}",
        date_stamp, SCOPE_REGION, SCOPE_SERVICE, SCOPE_SUFFIX
    );
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        SCHEME,
        date_time,
        scope,
        hex_sha256(canonical_request.as_bytes())
    );

    let key = derive_signing_key(&credentials.secret_key, &date_stamp);
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

    let authorization = format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        SCHEME,
        credentials.access_key(),
        scope,
        SIGNED_HEADERS,
        signature
    );
    (date_time, authorization)
}

/// Derive the date-scoped signing key: an HMAC chain over the date, the
/// region label, the service label and the scheme suffix
fn derive_signing_key(secret_key: &str, date_stamp: &str) -> Vec<u8> {
    let seed = format!("STRATA1{}", secret_key);
    let k_date = hmac_sha256(seed.as_bytes(), date_stamp.as_bytes());
    let k_region = hmac_sha256(&k_date, SCOPE_REGION.as_bytes());
    let k_service = hmac_sha256(&k_region, SCOPE_SERVICE.as_bytes());
    hmac_sha256(&k_service, SCOPE_SUFFIX.as_bytes())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC key of any length is valid");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn host_with_port(url: &url::Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::request::{build, Operation};
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn creds() -> Credentials {
        Credentials::new("app:test", "super-secret")
    }

    fn signed(op: Operation) -> SignedRequest {
        let req = build(&op, &SessionConfig::default()).unwrap();
        authorize(req, &creds(), None, fixed_time()).unwrap()
    }

    fn auth_header(req: &SignedRequest) -> String {
        req.headers()
            .iter()
            .find(|(k, _)| k == "authorization")
            .map(|(_, v)| v.clone())
            .unwrap()
    }

    #[test]
    fn test_signing_is_deterministic() {
        let a = signed(Operation::post("cat").body(json!({"name": "Tom"})));
        let b = signed(Operation::post("cat").body(json!({"name": "Tom"})));
        assert_eq!(auth_header(&a), auth_header(&b));
    }

    #[test]
    fn test_signature_shape() {
        let req = signed(Operation::get("cat"));
        let auth = auth_header(&req);
        assert!(auth.starts_with("STRATA1-HMAC-SHA256 Credential=app:test/20240301/"));
        assert!(auth.contains("SignedHeaders=host;x-strata-date"));
        assert!(auth.contains("Signature="));
        assert!(req.headers().iter().any(|(k, v)| k == DATE_HEADER && v == "20240301T120000Z"));
    }

    #[test]
    fn test_any_component_change_changes_signature() {
        let base = signed(Operation::post("cat").body(json!({"name": "Tom"})));

        let body_changed = signed(Operation::post("cat").body(json!({"name": "Tom!"})));
        assert_ne!(auth_header(&base), auth_header(&body_changed));

        let path_changed = signed(Operation::post("dog").body(json!({"name": "Tom"})));
        assert_ne!(auth_header(&base), auth_header(&path_changed));

        let query_changed =
            signed(Operation::post("cat").param("x", "1").body(json!({"name": "Tom"})));
        assert_ne!(auth_header(&base), auth_header(&query_changed));

        let req = build(
            &Operation::post("cat").body(json!({"name": "Tom"})),
            &SessionConfig::default(),
        )
        .unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 1).unwrap();
        let time_changed = authorize(req, &creds(), None, later).unwrap();
        assert_ne!(auth_header(&base), auth_header(&time_changed));
    }

    #[test]
    fn test_blank_access_key_is_configuration_error() {
        let req = build(&Operation::get("cat"), &SessionConfig::default()).unwrap();
        let result = authorize(req, &Credentials::new("", "secret"), None, fixed_time());
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_token_bypasses_signing() {
        let req = build(&Operation::get("cat"), &SessionConfig::default()).unwrap();
        let signed = authorize(req, &creds(), Some("jwt-token"), fixed_time()).unwrap();
        let auth = auth_header(&signed);
        assert_eq!(auth, "Bearer jwt-token");
        assert!(!signed.headers().iter().any(|(k, _)| k == DATE_HEADER));
    }

    #[test]
    fn test_blank_secret_sends_anonymous() {
        let req = build(&Operation::get("cat"), &SessionConfig::default()).unwrap();
        let signed = authorize(req, &Credentials::new("app:test", ""), None, fixed_time()).unwrap();
        assert_eq!(auth_header(&signed), "Anonymous app:test");
    }

    #[test]
    fn test_explicit_auth_header_wins() {
        let req = build(
            &Operation::get("_me").header("authorization", "Bearer explicit"),
            &SessionConfig::default(),
        )
        .unwrap();
        let signed = authorize(req, &creds(), Some("configured"), fixed_time()).unwrap();
        let auths: Vec<_> = signed
            .headers()
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
            .collect();
        assert_eq!(auths.len(), 1);
        assert_eq!(auths[0].1, "Bearer explicit");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", creds());
        assert!(debug.contains("app:test"));
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
