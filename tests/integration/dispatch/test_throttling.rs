use crate::common::*;
use ccxt_dispatch::prelude::*;
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_endpoint_cost_delays_next_request() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let (exchange, _) = create_with(&server, |builder| {
        builder
            .enable_rate_limit(true)
            .rate_limit(Duration::from_millis(50))
    });
    assert_eq!(exchange.registry().require("publicGetDepth").unwrap().cost, 5.0);

    let start = Instant::now();
    exchange.request("publicGetDepth", Params::new()).await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(200));

    exchange.request("publicGetTime", Params::new()).await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(240), "{elapsed:?}");
}

#[tokio::test]
async fn test_concurrent_requests_are_spaced() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let (exchange, _) = create_with(&server, |builder| {
        builder
            .enable_rate_limit(true)
            .rate_limit(Duration::from_millis(40))
    });

    let start = Instant::now();
    let results = futures_join(&exchange, 4).await;
    assert!(results.iter().all(Result::is_ok));
    // first call is free, the other three each wait one interval
    assert!(start.elapsed() >= Duration::from_millis(110), "{:?}", start.elapsed());
    assert_eq!(exchange.throttler().unwrap().queue_len(), 0);
}

async fn futures_join(exchange: &BaseExchange, n: usize) -> Vec<Result<ApiResponse>> {
    let handles: Vec<_> = (0..n)
        .map(|_| {
            let exchange = exchange.clone();
            tokio::spawn(async move { exchange.request("publicGetTime", Params::new()).await })
        })
        .collect();
    let mut results = Vec::with_capacity(n);
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

#[tokio::test]
async fn test_rate_limit_disabled_skips_throttler() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let (exchange, _) = create_with(&server, |builder| {
        builder
            .enable_rate_limit(false)
            .rate_limit(Duration::from_secs(10))
    });
    assert!(exchange.throttler().is_none());

    let start = Instant::now();
    for _ in 0..3 {
        exchange.request("publicGetTime", Params::new()).await.unwrap();
    }
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_explicit_token_bucket_overrides_rate_limit() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let bucket = ThrottlerConfig::default()
        .with_capacity(10.0)
        .with_refill_rate(0.001)
        .with_tokens(10.0);
    let (exchange, _) = create_with(&server, |builder| {
        builder.enable_rate_limit(true).token_bucket(bucket)
    });

    // ten tokens up front: three cost-1 calls and one cost-5 call run back to back
    let start = Instant::now();
    for _ in 0..3 {
        exchange.request("publicGetTime", Params::new()).await.unwrap();
    }
    exchange.request("publicGetDepth", Params::new()).await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(500));
    assert!(exchange.throttler().unwrap().available_tokens() <= 2.0);
}
