use crate::common::*;
use ccxt_dispatch::prelude::*;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_public_get_returns_parsed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"serverTime": 1_700_000_000_000_i64})))
        .expect(1)
        .mount(&server)
        .await;

    let (exchange, _) = create_exchange(&server);
    let response = exchange.request("publicGetTime", Params::new()).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.data["serverTime"], 1_700_000_000_000_i64);
    assert_eq!(response.request.method, HttpMethod::Get);
    assert_eq!(response.endpoint.name, "publicGetTime");
    assert!(response.response.is_json);
}

#[tokio::test]
async fn test_snake_case_alias_and_path_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ticker/BTCUSDT"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"last": "42000.1"})))
        .expect(1)
        .mount(&server)
        .await;

    let (exchange, _) = create_exchange(&server);
    let mut params = Params::new();
    params.insert("symbol".into(), json!("BTCUSDT"));
    params.insert("limit".into(), json!(5));
    let response = exchange.request("public_get_ticker_symbol", params).await.unwrap();

    assert_eq!(response.data["last"], "42000.1");
    assert!(response.request.url.ends_with("/ticker/BTCUSDT?limit=5"));
}

#[tokio::test]
async fn test_default_and_call_headers_are_merged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/time"))
        .and(header("x-client", "dispatch"))
        .and(header("x-trace", "call"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let (exchange, _) = create_with(&server, |builder| {
        builder
            .enable_rate_limit(false)
            .header("X-Client", "dispatch")
            .header("X-Trace", "default")
    });
    let mut headers = HeaderMap::new();
    headers.insert("x-trace", HeaderValue::from_static("call"));
    exchange
        .request_with("publicGetTime", Params::new(), headers, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_private_request_is_signed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/order"))
        .and(header("x-api-key", "key-123"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("symbol=BTCUSDT"))
        .and(body_string_contains("nonce="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"orderId": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let (exchange, _) = create_with(&server, |builder| {
        builder
            .enable_rate_limit(false)
            .api_key("key-123")
            .secret("s3cret")
    });
    let mut params = Params::new();
    params.insert("symbol".into(), json!("BTCUSDT"));
    let response = exchange.request("privatePostOrder", params).await.unwrap();

    assert_eq!(response.data["orderId"], 7);
    assert_eq!(response.request.method, HttpMethod::Post);
    assert!(response.request.body.as_deref().unwrap().contains("symbol=BTCUSDT"));
}

#[tokio::test]
async fn test_private_request_without_credentials_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (exchange, _) = create_exchange(&server);
    let mut params = Params::new();
    params.insert("id".into(), json!("42"));
    assert_error_kind(
        exchange.request("privateDeleteOrderId", params).await,
        ErrorKind::Authentication,
    );
}

#[tokio::test]
async fn test_non_json_body_is_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/time"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let (exchange, _) = create_exchange(&server);
    let response = exchange.request("publicGetTime", Params::new()).await.unwrap();
    assert!(!response.response.is_json);
    assert_eq!(response.data, json!("pong"));
}

#[tokio::test]
async fn test_unknown_endpoint_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (exchange, _) = create_exchange(&server);
    assert_error_kind(
        exchange.request("publicGetOrderbook", Params::new()).await,
        ErrorKind::NotSupported,
    );
}

#[tokio::test]
async fn test_patch_body_defaults_to_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/settings"))
        .and(header("content-type", "application/json"))
        .and(body_string_contains("\"leverage\":5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let (exchange, _) = create_exchange(&server);
    let response = exchange
        .request_with(
            "public_patch_settings",
            Params::new(),
            HeaderMap::new(),
            Some(json!({"leverage": 5}).to_string()),
        )
        .await
        .unwrap();

    assert_eq!(response.request.method, HttpMethod::Patch);
    assert_eq!(response.data["ok"], true);
}

#[tokio::test]
async fn test_get_without_body_sends_no_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let (exchange, _) = create_exchange(&server);
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    exchange
        .request_with("publicGetTime", Params::new(), headers, None)
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("content-type").is_none());
}
