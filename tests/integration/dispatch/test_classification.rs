use crate::common::*;
use ccxt_dispatch::prelude::*;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn respond_time(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/time"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_429_is_rate_limit_with_retry_after() {
    let server = MockServer::start().await;
    respond_time(
        &server,
        ResponseTemplate::new(429)
            .insert_header("Retry-After", "7")
            .set_body_string("slow down"),
    )
    .await;

    let (exchange, _) = create_exchange(&server);
    let err = assert_error_kind(
        exchange.request("publicGetTime", Params::new()).await,
        ErrorKind::RateLimitExceeded,
    );
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    assert!(err.to_string().contains("mock GET"));
    assert!(err.to_string().contains("429"));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_418_is_ddos_protection() {
    let server = MockServer::start().await;
    respond_time(&server, ResponseTemplate::new(418).set_body_string("teapot")).await;

    let (exchange, _) = create_exchange(&server);
    assert_error_kind(
        exchange.request("publicGetTime", Params::new()).await,
        ErrorKind::DdosProtection,
    );
}

#[tokio::test]
async fn test_401_is_authentication() {
    let server = MockServer::start().await;
    respond_time(&server, ResponseTemplate::new(401).set_body_json(json!({"error": "bad key"}))).await;

    let (exchange, _) = create_exchange(&server);
    let err = assert_error_kind(
        exchange.request("publicGetTime", Params::new()).await,
        ErrorKind::Authentication,
    );
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_503_behind_cloudflare_is_ddos_protection() {
    let server = MockServer::start().await;
    respond_time(
        &server,
        ResponseTemplate::new(503).set_body_string("<html>Cloudflare Ray ID</html>"),
    )
    .await;

    let (exchange, _) = create_exchange(&server);
    assert_error_kind(
        exchange.request("publicGetTime", Params::new()).await,
        ErrorKind::DdosProtection,
    );
}

#[tokio::test]
async fn test_plain_503_is_exchange_not_available() {
    let server = MockServer::start().await;
    respond_time(&server, ResponseTemplate::new(503).set_body_string("down")).await;

    let (exchange, _) = create_exchange(&server);
    assert_error_kind(
        exchange.request("publicGetTime", Params::new()).await,
        ErrorKind::ExchangeNotAvailable,
    );
}

#[tokio::test]
async fn test_unmapped_status_passes_through() {
    let server = MockServer::start().await;
    respond_time(&server, ResponseTemplate::new(499).set_body_json(json!({"note": "odd"}))).await;

    let (exchange, _) = create_exchange(&server);
    let response = exchange.request("publicGetTime", Params::new()).await.unwrap();
    assert_eq!(response.status(), 499);
    assert_eq!(response.data["note"], "odd");
}

#[tokio::test]
async fn test_exchange_error_code_in_success_response() {
    let server = MockServer::start().await;
    respond_time(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"code": -1121, "msg": "Invalid symbol."})),
    )
    .await;

    let (exchange, _) = create_exchange(&server);
    let err = assert_error_kind(
        exchange.request("publicGetTime", Params::new()).await,
        ErrorKind::BadSymbol,
    );
    assert!(err.to_string().contains("-1121"));
}

#[tokio::test]
async fn test_broad_error_message_match() {
    let server = MockServer::start().await;
    respond_time(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({"code": -1003, "msg": "Too many requests; slow down"})),
    )
    .await;

    let (exchange, _) = create_exchange(&server);
    assert_error_kind(
        exchange.request("publicGetTime", Params::new()).await,
        ErrorKind::RateLimitExceeded,
    );
}

#[tokio::test]
async fn test_truncated_json_is_classified_by_keywords() {
    let server = MockServer::start().await;
    respond_time(
        &server,
        ResponseTemplate::new(200).set_body_string("{\"status\": \"maintenance"),
    )
    .await;

    let (exchange, _) = create_exchange(&server);
    assert_error_kind(
        exchange.request("publicGetTime", Params::new()).await,
        ErrorKind::ExchangeNotAvailable,
    );
}

#[tokio::test]
async fn test_fetch_raw_keeps_failed_response_for_diagnostics() {
    let server = MockServer::start().await;
    respond_time(&server, ResponseTemplate::new(401).set_body_string("nope")).await;

    let (exchange, _) = create_exchange(&server);
    let raw = exchange
        .fetch_raw("publicGetTime", Params::new(), Default::default(), None)
        .await
        .unwrap();
    assert_eq!(raw.response.raw_body, "nope");
    assert_error_kind(
        exchange.classify(&raw.request, &raw.response),
        ErrorKind::Authentication,
    );
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let server = MockServer::start().await;
    let (exchange, _) = create_with(&server, |builder| {
        builder
            .enable_rate_limit(false)
            .url_override("public", "http://127.0.0.1:9")
    });

    let err = exchange
        .request("publicGetTime", Params::new())
        .await
        .unwrap_err();
    assert!(err.is_retryable(), "{err}");
    assert!(matches!(err.root_cause(), Error::Network(_)));
}
