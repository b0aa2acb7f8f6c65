//! Market data caching structures and operations

use crate::error::{Error, Result};
use crate::types::{Currency, Market, PrecisionMode};
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

/// Future shared by every caller waiting on one market load.
pub(crate) type LoadFuture = Shared<BoxFuture<'static, Result<Arc<MarketSnapshot>>>>;

/// One load generation of markets and currencies.
///
/// Snapshots are immutable; a reload builds a new one and swaps it in, so the
/// symbol and id indexes always describe the same generation.
#[derive(Debug, Default)]
pub struct MarketSnapshot {
    /// Markets indexed by symbol (e.g., "BTC/USDT")
    pub markets: HashMap<String, Arc<Market>>,
    /// Markets indexed by exchange-specific ID; several markets may share one
    pub markets_by_id: HashMap<String, Vec<Arc<Market>>>,
    /// Currencies indexed by code (e.g., "BTC")
    pub currencies: HashMap<String, Arc<Currency>>,
    /// Currencies indexed by exchange-specific ID
    pub currencies_by_id: HashMap<String, Arc<Currency>>,
    /// Sorted symbols
    pub symbols: Vec<String>,
    /// Sorted currency codes
    pub codes: Vec<String>,
    /// Sorted market IDs
    pub ids: Vec<String>,
    /// Whether markets have been loaded
    pub loaded: bool,
}

impl MarketSnapshot {
    /// Indexes `markets` and `currencies`.
    ///
    /// Without fetched currencies, they are derived from the markets' base
    /// and quote legs, keeping the finest precision seen per code.
    pub fn build(
        markets: Vec<Market>,
        currencies: Option<Vec<Currency>>,
        precision_mode: PrecisionMode,
    ) -> Self {
        let currencies = currencies.unwrap_or_else(|| derive_currencies(&markets, precision_mode));

        let mut snapshot = Self {
            loaded: true,
            ..Self::default()
        };

        for market in markets {
            let market = Arc::new(market);
            snapshot
                .markets_by_id
                .entry(market.id.clone())
                .or_default()
                .push(Arc::clone(&market));
            snapshot.markets.insert(market.symbol.clone(), market);
        }
        for currency in currencies {
            let currency = Arc::new(currency);
            snapshot
                .currencies_by_id
                .insert(currency.id.clone(), Arc::clone(&currency));
            snapshot.currencies.insert(currency.code.clone(), currency);
        }

        snapshot.symbols = snapshot.markets.keys().cloned().collect();
        snapshot.symbols.sort();
        snapshot.ids = snapshot.markets_by_id.keys().cloned().collect();
        snapshot.ids.sort();
        snapshot.codes = snapshot.currencies.keys().cloned().collect();
        snapshot.codes.sort();
        snapshot
    }

    /// Market by unified symbol.
    pub fn market(&self, symbol: &str) -> Result<Arc<Market>> {
        self.markets
            .get(symbol)
            .cloned()
            .ok_or_else(|| Error::bad_symbol(format!("Market {symbol} not found")))
    }

    /// First market listed under an exchange id.
    pub fn market_by_id(&self, id: &str) -> Option<Arc<Market>> {
        self.markets_by_id.get(id).and_then(|m| m.first()).cloned()
    }

    /// Every market listed under an exchange id.
    pub fn markets_by_id(&self, id: &str) -> &[Arc<Market>] {
        self.markets_by_id.get(id).map_or(&[], Vec::as_slice)
    }

    /// Currency by unified code.
    pub fn currency(&self, code: &str) -> Result<Arc<Currency>> {
        self.currencies
            .get(code)
            .cloned()
            .ok_or_else(|| Error::bad_symbol(format!("Currency {code} not found")))
    }

    /// Currency by exchange id.
    pub fn currency_by_id(&self, id: &str) -> Option<Arc<Currency>> {
        self.currencies_by_id.get(id).cloned()
    }
}

fn derive_currencies(markets: &[Market], mode: PrecisionMode) -> Vec<Currency> {
    let default = mode.default_precision();
    let mut by_code: HashMap<String, Currency> = HashMap::new();

    let legs = markets.iter().flat_map(|market| {
        let precision = &market.precision;
        [
            (
                &market.base,
                market.base_id.as_ref(),
                precision.base.or(precision.amount),
            ),
            (
                &market.quote,
                market.quote_id.as_ref(),
                precision.quote.or(precision.price),
            ),
        ]
    });

    for (code, id, precision) in legs {
        if code.is_empty() {
            continue;
        }
        let precision = precision.unwrap_or(default);
        let candidate =
            || Currency::new(code.clone(), id.unwrap_or(code).clone()).with_precision(precision);
        match by_code.entry(code.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(candidate());
            }
            // the finer leg replaces the whole entry, id included
            Entry::Occupied(mut slot) => {
                if slot.get().precision.is_none_or(|p| mode.is_finer(precision, p)) {
                    slot.insert(candidate());
                }
            }
        }
    }

    by_code.into_values().collect()
}

/// An in-flight load.
pub(crate) struct PendingLoad {
    pub(crate) future: LoadFuture,
    pub(crate) reload: bool,
}

/// Market cache of one exchange instance.
///
/// Holds the current [`MarketSnapshot`] and the single pending load.
pub struct MarketCache {
    snapshot: RwLock<Arc<MarketSnapshot>>,
    pub(crate) pending: Mutex<Option<PendingLoad>>,
}

impl std::fmt::Debug for MarketCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketCache").finish_non_exhaustive()
    }
}

impl Default for MarketCache {
    fn default() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(MarketSnapshot::default())),
            pending: Mutex::new(None),
        }
    }
}

impl MarketCache {
    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<MarketSnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Swaps in a new snapshot.
    pub async fn commit(&self, snapshot: MarketSnapshot, exchange_id: &str) -> Arc<MarketSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.snapshot.write().await = Arc::clone(&snapshot);
        info!(
            "Loaded {} markets and {} currencies for {}",
            snapshot.markets.len(),
            snapshot.currencies.len(),
            exchange_id
        );
        snapshot
    }

    /// Whether a snapshot has been committed.
    pub async fn is_loaded(&self) -> bool {
        self.snapshot.read().await.loaded
    }

    /// Whether a reload is in flight.
    pub async fn is_reloading(&self) -> bool {
        self.pending
            .lock()
            .await
            .as_ref()
            .is_some_and(|pending| pending.reload)
    }

    /// Whether any load is in flight.
    pub async fn is_loading(&self) -> bool {
        self.pending.lock().await.is_some()
    }
}
