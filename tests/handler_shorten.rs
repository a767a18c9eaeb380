mod common;

use axum::http::StatusCode;
use serde_json::json;
use shortlink::domain::repositories::LinkRepository;
use shortlink::utils::code_generator::is_well_formed;

#[tokio::test]
async fn test_shorten_creates_link() {
    let ctx = common::create_test_state();
    let server = common::test_server(ctx.state);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com/some/long/path" }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body = response.json::<serde_json::Value>();
    let code = body["short_code"].as_str().unwrap();
    assert!(is_well_formed(code));
    assert_eq!(body["original_url"], "https://example.com/some/long/path");
    assert_eq!(body["short_url"], format!("{}/{}", common::BASE_URL, code));

    let stored = ctx.store.find_by_code(code).await.unwrap();
    assert_eq!(stored.original_url, "https://example.com/some/long/path");
    assert_eq!(stored.clicks, 0);
}

#[tokio::test]
async fn test_shorten_same_url_twice_gives_distinct_codes() {
    let ctx = common::create_test_state();
    let server = common::test_server(ctx.state);
    let payload = json!({ "url": "https://example.com/page" });

    let first = server.post("/api/shorten").json(&payload).await;
    let second = server.post("/api/shorten").json(&payload).await;

    let first = first.json::<serde_json::Value>();
    let second = second.json::<serde_json::Value>();
    assert_ne!(first["short_code"], second["short_code"]);
    assert_eq!(ctx.store.len().await, 2);
}

#[tokio::test]
async fn test_shorten_rejects_unsupported_scheme() {
    let ctx = common::create_test_state();
    let server = common::test_server(ctx.state);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "ftp://example.com/file" }))
        .await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn test_shorten_rejects_short_url() {
    let ctx = common::create_test_state();
    let server = common::test_server(ctx.state);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "http://a" }))
        .await;

    response.assert_status_bad_request();
    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn test_shorten_rejects_empty_url() {
    let ctx = common::create_test_state();
    let server = common::test_server(ctx.state);

    let response = server.post("/api/shorten").json(&json!({ "url": "" })).await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_shorten_missing_body_field() {
    let ctx = common::create_test_state();
    let server = common::test_server(ctx.state);

    let response = server.post("/api/shorten").json(&json!({})).await;

    assert!(response.status_code().is_client_error());
    assert!(ctx.store.is_empty().await);
}
