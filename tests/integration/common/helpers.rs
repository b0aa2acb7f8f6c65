//! Mock exchange wired to a wiremock server.

#![allow(dead_code)]

use async_trait::async_trait;
use ccxt_dispatch::prelude::*;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::MockServer;

/// A small exchange with one public and one private group.
///
/// Private calls send the API key as a header and the parameters plus a
/// nonce as a form body. Error payloads look like `{"code": -1121, "msg": ...}`.
pub struct MockExchange {
    codes: ErrorCodeMap,
    pub market_calls: Arc<AtomicUsize>,
}

impl Default for MockExchange {
    fn default() -> Self {
        Self {
            codes: ErrorCodeMap::new()
                .exact("-1121", ErrorKind::BadSymbol)
                .exact("-2015", ErrorKind::Authentication)
                .broad("Too many requests", ErrorKind::RateLimitExceeded),
            market_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ExchangeHooks for MockExchange {
    fn api_definition(&self) -> Value {
        json!({
            "public": {
                "get": {
                    "time": 1,
                    "markets": 1,
                    "depth": 5,
                    "ticker/{symbol}": 1
                },
                "patch": ["settings"]
            },
            "private": {
                "post": {"order": {"cost": 2}},
                "delete": ["order/{id}"]
            }
        })
    }

    fn urls(&self) -> HashMap<String, String> {
        HashMap::from([
            ("public".into(), "https://api.mock.invalid/v1".into()),
            ("private".into(), "https://api.mock.invalid/v1".into()),
        ])
    }

    fn sign(&self, request: SignRequest<'_>) -> Result<RequestEnvelope> {
        if request.endpoint.api_group() != "private" {
            return default_sign(request);
        }
        request.credentials.require(&["apiKey", "secret"])?;

        let mut params = request.query_params();
        params.insert("nonce".into(), json!(ccxt_dispatch::signer::nonce()));
        let api_key = request
            .credentials
            .api_key
            .as_ref()
            .map(SecretString::expose_secret)
            .unwrap_or_default();

        let mut envelope = RequestEnvelope::new(request.endpoint.method, request.url()?);
        envelope.headers = request.headers;
        envelope.headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).map_err(|e| Error::authentication(e.to_string()))?,
        );
        envelope.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        envelope.body = Some(ccxt_dispatch::signer::urlencode(&params));
        Ok(envelope)
    }

    fn handle_errors(&self, ctx: &ResponseContext<'_>) -> Result<()> {
        let body = &ctx.response.body;
        let Some(code) = body.get("code").and_then(Value::as_i64) else {
            return Ok(());
        };
        if code == 0 {
            return Ok(());
        }
        let msg = body.get("msg").and_then(Value::as_str).unwrap_or_default();
        self.codes.check(
            Some(&code.to_string()),
            msg,
            &format!("{} {}", ctx.exchange_id, ctx.response.raw_body),
        )
    }

    async fn fetch_markets(&self, exchange: &BaseExchange) -> Result<Vec<Market>> {
        self.market_calls.fetch_add(1, Ordering::SeqCst);
        let response = exchange.request("publicGetMarkets", Params::new()).await?;
        Ok(serde_json::from_value(response.data)?)
    }
}

/// Exchange pointed at `server`, rate limiting disabled.
pub fn create_exchange(server: &MockServer) -> (BaseExchange, Arc<AtomicUsize>) {
    create_with(server, |builder| builder.enable_rate_limit(false))
}

/// Exchange pointed at `server` with a customised config.
pub fn create_with(
    server: &MockServer,
    configure: impl FnOnce(ExchangeConfigBuilder) -> ExchangeConfigBuilder,
) -> (BaseExchange, Arc<AtomicUsize>) {
    let hooks = MockExchange::default();
    let calls = Arc::clone(&hooks.market_calls);
    let builder = ExchangeConfig::builder()
        .id("mock")
        .name("Mock")
        .timeout(Duration::from_secs(5))
        .url_override("public", server.uri())
        .url_override("private", server.uri());
    let exchange = BaseExchange::new(configure(builder).build(), hooks).unwrap();
    (exchange, calls)
}

/// Two spot markets with precision in decimal places.
pub fn markets_body() -> Value {
    json!([
        {
            "id": "BTCUSDT",
            "symbol": "BTC/USDT",
            "base": "BTC",
            "quote": "USDT",
            "type": "spot",
            "active": true,
            "precision": {"amount": "6", "price": "2"}
        },
        {
            "id": "ETHBTC",
            "symbol": "ETH/BTC",
            "base": "ETH",
            "quote": "BTC",
            "type": "spot",
            "active": true,
            "precision": {"amount": "4", "price": "8"}
        }
    ])
}
