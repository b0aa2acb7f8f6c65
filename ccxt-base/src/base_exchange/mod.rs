//! Base exchange implementation
//!
//! Provides the shared machinery every exchange client is built on:
//! - Endpoint registry compiled from the exchange's API definition
//! - Request signing, throttling and dispatch
//! - Response classification
//! - Market and currency cache with deduplicated loading

mod config;
mod market_cache;
mod requests;

pub use config::{ExchangeConfig, ExchangeConfigBuilder};
pub use market_cache::{MarketCache, MarketSnapshot};
pub use requests::ApiResponse;

use crate::error::{ContextExt, Error, Result};
use crate::hooks::ExchangeHooks;
use crate::http_client::HttpClient;
use crate::registry::EndpointRegistry;
use crate::throttler::Throttler;
use crate::types::{Currency, Market};
use futures::FutureExt;
use market_cache::{LoadFuture, PendingLoad};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Handle to one exchange instance.
///
/// Cloning is cheap; clones share the HTTP client, throttler and market
/// cache.
#[derive(Clone)]
pub struct BaseExchange {
    inner: Arc<Inner>,
}

struct Inner {
    config: ExchangeConfig,
    http_client: HttpClient,
    registry: EndpointRegistry,
    urls: HashMap<String, String>,
    hooks: Arc<dyn ExchangeHooks>,
    markets: MarketCache,
}

impl std::fmt::Debug for BaseExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseExchange")
            .field("id", &self.inner.config.id)
            .field("endpoints", &self.inner.registry.len())
            .field("urls", &self.inner.urls)
            .field("throttler", &self.inner.http_client.throttler())
            .finish_non_exhaustive()
    }
}

impl BaseExchange {
    /// Creates a new exchange instance
    pub fn new(config: ExchangeConfig, hooks: impl ExchangeHooks) -> Result<Self> {
        Self::with_hooks(config, Arc::new(hooks))
    }

    /// Creates a new exchange instance from shared hooks.
    pub fn with_hooks(config: ExchangeConfig, hooks: Arc<dyn ExchangeHooks>) -> Result<Self> {
        info!("Initializing exchange: {}", config.id);

        if config.timeout.is_zero() {
            return Err(Error::invalid_request("timeout cannot be zero"));
        }
        if config.connect_timeout.is_zero() {
            return Err(Error::invalid_request("connect_timeout cannot be zero"));
        }

        let registry = EndpointRegistry::build(&hooks.api_definition())?;

        let mut urls = hooks.urls();
        urls.extend(
            config
                .url_overrides
                .iter()
                .map(|(group, url)| (group.clone(), url.clone())),
        );

        let mut http_client = HttpClient::new(config.http_config())?;
        if config.enable_rate_limit {
            http_client.set_throttler(Throttler::new(config.throttler_config()));
        }

        debug!(
            exchange = %config.id,
            endpoints = registry.len(),
            "Exchange initialized"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                http_client,
                registry,
                urls,
                hooks,
                markets: MarketCache::default(),
            }),
        })
    }

    /// Exchange identifier.
    pub fn id(&self) -> &str {
        &self.inner.config.id
    }

    /// Instance configuration.
    pub fn config(&self) -> &ExchangeConfig {
        &self.inner.config
    }

    /// Compiled endpoint registry.
    pub fn registry(&self) -> &EndpointRegistry {
        &self.inner.registry
    }

    /// Base URL per API group, overrides applied.
    pub fn urls(&self) -> &HashMap<String, String> {
        &self.inner.urls
    }

    /// Pooled HTTP client.
    pub fn http_client(&self) -> &HttpClient {
        &self.inner.http_client
    }

    /// Instance throttler, absent when rate limiting is disabled.
    pub fn throttler(&self) -> Option<&Throttler> {
        self.inner.http_client.throttler()
    }

    /// Exchange-specific hooks.
    pub fn hooks(&self) -> &dyn ExchangeHooks {
        self.inner.hooks.as_ref()
    }

    /// Market cache state.
    pub fn market_cache(&self) -> &MarketCache {
        &self.inner.markets
    }

    /// Loads markets (and currencies, when supported) once per instance.
    ///
    /// With `reload == false` a loaded cache is returned as is. Every caller
    /// arriving while a load is in flight, reloads included, awaits that
    /// same load; a failure reaches all of them and leaves the previous
    /// snapshot in place.
    pub async fn load_markets(&self, reload: bool) -> Result<Arc<MarketSnapshot>> {
        let load = {
            let mut pending = self.inner.markets.pending.lock().await;
            if let Some(in_flight) = pending.as_ref() {
                debug!("Joining in-flight market load for {}", self.id());
                in_flight.future.clone()
            } else {
                if !reload {
                    let snapshot = self.inner.markets.snapshot().await;
                    if snapshot.loaded {
                        debug!("Returning cached markets for {}", self.id());
                        return Ok(snapshot);
                    }
                }
                info!("Loading markets for {}", self.id());
                let future = self.spawn_load();
                *pending = Some(PendingLoad {
                    future: future.clone(),
                    reload,
                });
                future
            }
        };
        load.await
    }

    // The load runs on its own task so that it completes, and the pending
    // slot is cleared, even if every waiter is dropped.
    fn spawn_load(&self) -> LoadFuture {
        let exchange = self.clone();
        let handle = tokio::spawn(async move {
            let result = match exchange.fetch_snapshot().await {
                Ok(snapshot) => Ok(exchange.inner.markets.commit(snapshot, exchange.id()).await),
                Err(e) => {
                    warn!(error = %e, "Market load failed for {}", exchange.id());
                    Err(e)
                }
            };
            exchange.inner.markets.pending.lock().await.take();
            result
        });

        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(Error::exchange_not_available(format!(
                    "Market load task failed: {e}"
                ))),
            }
        }
        .boxed()
        .shared()
    }

    async fn fetch_snapshot(&self) -> Result<MarketSnapshot> {
        let hooks = self.hooks();
        let currencies = if hooks.has_fetch_currencies() {
            Some(
                hooks
                    .fetch_currencies(self)
                    .await
                    .with_context(|| format!("{} fetch_currencies", self.id()))?,
            )
        } else {
            None
        };
        let markets = hooks
            .fetch_markets(self)
            .await
            .with_context(|| format!("{} fetch_markets", self.id()))?;
        Ok(MarketSnapshot::build(
            markets,
            currencies,
            hooks.precision_mode(),
        ))
    }

    /// Replaces the cache with the given markets and currencies.
    pub async fn set_markets(
        &self,
        markets: Vec<Market>,
        currencies: Option<Vec<Currency>>,
    ) -> Arc<MarketSnapshot> {
        let snapshot = MarketSnapshot::build(markets, currencies, self.hooks().precision_mode());
        self.inner.markets.commit(snapshot, self.id()).await
    }

    /// Current snapshot, possibly empty.
    pub async fn markets(&self) -> Arc<MarketSnapshot> {
        self.inner.markets.snapshot().await
    }

    async fn loaded_snapshot(&self) -> Result<Arc<MarketSnapshot>> {
        let snapshot = self.inner.markets.snapshot().await;
        if snapshot.loaded {
            Ok(snapshot)
        } else {
            Err(Error::invalid_request(format!(
                "{} markets not loaded, call load_markets() first",
                self.id()
            )))
        }
    }

    /// Market by unified symbol.
    pub async fn market(&self, symbol: &str) -> Result<Arc<Market>> {
        self.loaded_snapshot().await?.market(symbol)
    }

    /// First market listed under an exchange id.
    pub async fn market_by_id(&self, id: &str) -> Result<Option<Arc<Market>>> {
        Ok(self.loaded_snapshot().await?.market_by_id(id))
    }

    /// Currency by unified code.
    pub async fn currency(&self, code: &str) -> Result<Arc<Currency>> {
        self.loaded_snapshot().await?.currency(code)
    }

    /// Currency by exchange id.
    pub async fn currency_by_id(&self, id: &str) -> Result<Option<Arc<Currency>>> {
        Ok(self.loaded_snapshot().await?.currency_by_id(id))
    }

    /// Every market listed under an exchange id.
    pub async fn markets_by_id(&self, id: &str) -> Result<Vec<Arc<Market>>> {
        Ok(self.loaded_snapshot().await?.markets_by_id(id).to_vec())
    }

    /// Sorted symbols of the loaded markets.
    pub async fn symbols(&self) -> Result<Vec<String>> {
        Ok(self.loaded_snapshot().await?.symbols.clone())
    }

    /// Sorted market ids.
    pub async fn ids(&self) -> Result<Vec<String>> {
        Ok(self.loaded_snapshot().await?.ids.clone())
    }

    /// Sorted currency codes.
    pub async fn codes(&self) -> Result<Vec<String>> {
        Ok(self.loaded_snapshot().await?.codes.clone())
    }

    /// Whether markets are loaded.
    pub async fn is_loaded(&self) -> bool {
        self.inner.markets.is_loaded().await
    }

    /// Whether a reload is in flight.
    pub async fn is_reloading(&self) -> bool {
        self.inner.markets.is_reloading().await
    }
}
