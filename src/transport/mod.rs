//! # Transport Invoker
//!
//! Executes one signed request over HTTP. Exactly one network attempt per
//! call: retry policy belongs to the caller, because blind retries on
//! non-idempotent writes are unsafe without idempotency keys. The
//! configured timeout aborts the underlying connection and is reported
//! distinctly from other network failures.

use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::errors::{ClientError, ClientResult};
use crate::signing::SignedRequest;

/// Raw response: status, headers and undecoded body bytes
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// HTTP transport backed by a shared connection pool
#[derive(Debug, Clone, Default)]
pub struct Transport {
    http: reqwest::Client,
}

impl Transport {
    pub fn new() -> Self {
        Transport {
            http: reqwest::Client::new(),
        }
    }

    /// Send a signed request, with the given per-request timeout.
    /// One attempt; the connection is released on success, error or
    /// timeout alike.
    pub async fn send(
        &self,
        request: SignedRequest,
        timeout: Duration,
    ) -> ClientResult<RawResponse> {
        let method = request.method().clone();
        let path = request.resource_path().to_string();

        let mut builder = self
            .http
            .request(method.clone(), request.url().clone())
            .timeout(timeout);
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.into_body() {
            builder = builder.body(body);
        }

        tracing::debug!(method = %method, path = %path, "dispatching request");

        let response = builder
            .send()
            .await
            .map_err(|e| classify(e, &method, &path))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify(e, &method, &path))?
            .to_vec();

        tracing::debug!(method = %method, path = %path, status, bytes = body.len(), "response received");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn classify(error: reqwest::Error, method: &reqwest::Method, path: &str) -> ClientError {
    if error.is_timeout() {
        ClientError::Timeout {
            method: method.to_string(),
            path: path.to_string(),
        }
    } else {
        ClientError::Network {
            method: method.to_string(),
            path: path.to_string(),
            message: error.to_string(),
        }
    }
}
