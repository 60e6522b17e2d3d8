//! Request Pipeline Tests
//!
//! End-to-end construction of unsigned requests: path and query encoding,
//! body handling per method, config snapshots, and pager parameter
//! mapping.

use serde_json::json;
use strata_client::config::SessionConfig;
use strata_client::request::{build, urlenc, Operation};
use strata_client::{GenericObject, Pager};

fn config() -> SessionConfig {
    let mut config = SessionConfig::default();
    config.set_endpoint("http://localhost:8080").unwrap();
    config
}

// =============================================================================
// URL construction
// =============================================================================

#[test]
fn test_full_url_has_api_prefix_and_sorted_query() {
    let op = Operation::get("cat")
        .param("q", "gray cat")
        .param("limit", "30")
        .param("desc", "true");
    let req = build(&op, &config()).unwrap();

    assert_eq!(
        req.url.as_str(),
        "http://localhost:8080/v1/cat?desc=true&limit=30&q=gray%20cat"
    );
    assert_eq!(req.resource_path, "/v1/cat");
}

#[test]
fn test_object_uri_segments_survive_encoding() {
    let obj = GenericObject::with_id("dog 2", "123 56");
    let op = Operation::get(&obj.object_uri());
    let req = build(&op, &config()).unwrap();
    assert_eq!(req.resource_path, "/v1/dog%202/123%2056");
    assert_eq!(req.url.path(), "/v1/dog%202/123%2056");
}

#[test]
fn test_space_encodes_as_percent20_never_plus() {
    assert_eq!(urlenc("a b+c"), "a%20b%2Bc");
    let op = Operation::get("cat").param("q", "a b+c");
    let req = build(&op, &config()).unwrap();
    assert!(req.url.as_str().contains("q=a%20b%2Bc"));
}

#[test]
fn test_token_path_bypasses_version_prefix() {
    let op = Operation::get("/jwt_auth");
    let req = build(&op, &config()).unwrap();
    assert_eq!(req.resource_path, "/jwt_auth");
}

// =============================================================================
// Body handling
// =============================================================================

#[test]
fn test_post_body_bytes_match_json() {
    let op = Operation::post("cat").body(json!({"name": "Tom", "age": 3}));
    let req = build(&op, &config()).unwrap();
    let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({"name": "Tom", "age": 3}));
    assert!(req
        .headers
        .contains(&("content-type".to_string(), "application/json".to_string())));
}

#[test]
fn test_bodyless_methods_never_carry_body() {
    for op in [
        Operation::get("cat").body(json!({"x": 1})),
        Operation::delete("cat/1").body(json!({"x": 1})),
    ] {
        let req = build(&op, &config()).unwrap();
        assert!(req.body.is_none());
        assert!(!req.headers.iter().any(|(k, _)| k == "content-type"));
    }
}

#[test]
fn test_generic_object_body_preserves_unknown_fields() {
    let mut obj = GenericObject::with_id("cat", "c1");
    obj.set("pattern", json!("tabby"))
        .set("extras", json!({"claws": true}));

    let op = Operation::put(&obj.object_uri()).body(obj.to_value());
    let req = build(&op, &config()).unwrap();

    let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["pattern"], "tabby");
    assert_eq!(body["extras"]["claws"], true);
    assert_eq!(body["type"], "cat");
}

// =============================================================================
// Config snapshots
// =============================================================================

#[test]
fn test_requests_use_the_config_they_were_built_with() {
    let mut config = config();
    let before = build(&Operation::get("cat"), &config).unwrap();

    config.set_api_path("/v2/");
    config.set_endpoint("http://other:9090").unwrap();
    let after = build(&Operation::get("cat"), &config).unwrap();

    assert_eq!(before.url.as_str(), "http://localhost:8080/v1/cat");
    assert_eq!(after.url.as_str(), "http://other:9090/v2/cat");
}

// =============================================================================
// Pager mapping
// =============================================================================

#[test]
fn test_pager_params_reach_the_query() {
    let mut pager = Pager::new(3, 10).sorted_by("name", false);
    pager.last_key = Some("k9".to_string());

    let op = Operation::get("cat").params(pager.to_params());
    let req = build(&op, &config()).unwrap();
    let query = req.canonical_query;
    assert!(query.contains("page=3"));
    assert!(query.contains("limit=10"));
    assert!(query.contains("sort=name"));
    assert!(query.contains("desc=false"));
    assert!(query.contains("lastKey=k9"));
}
