use crate::common::*;
use ccxt_dispatch::prelude::*;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_concurrent_loads_hit_server_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(markets_body())
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (exchange, calls) = create_exchange(&server);
    let (a, b, c) = tokio::join!(
        exchange.load_markets(false),
        exchange.load_markets(false),
        exchange.load_markets(false),
    );
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert!(Arc::ptr_eq(&a, &b) && Arc::ptr_eq(&b, &c));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(a.symbols, vec!["BTC/USDT", "ETH/BTC"]);
}

#[tokio::test]
async fn test_markets_and_derived_currencies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(markets_body()))
        .mount(&server)
        .await;

    let (exchange, _) = create_exchange(&server);
    exchange.load_markets(false).await.unwrap();

    let market = exchange.market("BTC/USDT").await.unwrap();
    assert_eq!(market.id, "BTCUSDT");
    assert_eq!(market.precision.amount, Some(dec!(6)));

    // BTC is the base of BTC/USDT (amount 6) and the quote of ETH/BTC (price 8)
    assert_eq!(exchange.currency("BTC").await.unwrap().precision, Some(dec!(8)));
    assert_eq!(exchange.currency("USDT").await.unwrap().precision, Some(dec!(2)));
    assert_eq!(exchange.markets().await.codes, vec!["BTC", "ETH", "USDT"]);
    assert_error_kind(exchange.market("DOGE/USDT").await, ErrorKind::BadSymbol);
}

#[tokio::test]
async fn test_reload_fetches_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(markets_body()))
        .expect(2)
        .mount(&server)
        .await;

    let (exchange, calls) = create_exchange(&server);
    exchange.load_markets(false).await.unwrap();
    exchange.load_markets(false).await.unwrap();
    exchange.load_markets(true).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_load_reaches_all_waiters_and_can_be_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(
            ResponseTemplate::new(502)
                .set_body_string("bad gateway")
                .set_delay(Duration::from_millis(50)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(markets_body()))
        .mount(&server)
        .await;

    let (exchange, calls) = create_exchange(&server);
    let (a, b) = tokio::join!(exchange.load_markets(false), exchange.load_markets(false));
    assert_error_kind(a, ErrorKind::ExchangeNotAvailable);
    assert_error_kind(b, ErrorKind::ExchangeNotAvailable);
    assert!(!exchange.is_loaded().await);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    exchange.load_markets(false).await.unwrap();
    assert!(exchange.is_loaded().await);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
