//! Absence Semantics Tests
//!
//! End-to-end behavior over a live socket when the server reports a
//! missing resource: delete stays idempotent, soft reads yield `None`,
//! plain reads surface the typed error, and non-absence failures still
//! propagate.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use strata_client::{ClientError, StrataClient};

const NOT_FOUND_BODY: &str = r#"{"code":404,"message":"Object not found."}"#;

/// Serve exactly one connection with a canned HTTP response
async fn serve_once(status: &'static str, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = stream.read(&mut request).await;
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    });
    addr
}

fn client_for(addr: SocketAddr) -> StrataClient {
    let client = StrataClient::new("app:test", "secret");
    client.set_endpoint(&format!("http://{}", addr)).unwrap();
    client
}

// =============================================================================
// Absence softening
// =============================================================================

#[tokio::test]
async fn test_delete_of_absent_object_is_success() {
    let addr = serve_once("404 Not Found", NOT_FOUND_BODY).await;
    let client = client_for(addr);
    client.delete("cat", "long-gone").await.unwrap();
}

#[tokio::test]
async fn test_read_opt_softens_not_found_to_none() {
    let addr = serve_once("404 Not Found", NOT_FOUND_BODY).await;
    let client = client_for(addr);
    assert_eq!(client.read_opt("cat", "long-gone").await.unwrap(), None);
}

#[tokio::test]
async fn test_read_surfaces_not_found() {
    let addr = serve_once("404 Not Found", NOT_FOUND_BODY).await;
    let client = client_for(addr);
    let err = client.read("cat", "long-gone").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));
}

// =============================================================================
// Only absence is softened
// =============================================================================

#[tokio::test]
async fn test_delete_propagates_non_absence_errors() {
    let addr = serve_once("503 Service Unavailable", r#"{"code":503,"message":"busy"}"#).await;
    let client = client_for(addr);
    let err = client.delete("cat", "c1").await.unwrap_err();
    assert!(matches!(err, ClientError::Service { status: 503, .. }));
}

#[tokio::test]
async fn test_read_opt_propagates_auth_errors() {
    let addr = serve_once("403 Forbidden", r#"{"code":403,"message":"denied"}"#).await;
    let client = client_for(addr);
    let err = client.read_opt("cat", "c1").await.unwrap_err();
    assert!(matches!(err, ClientError::Auth { status: 403, .. }));
}
