//! Market type definitions
//!
//! A `Market` is one tradable instrument as returned by an exchange's
//! `fetch_markets` hook. The loader only relies on `id`, `symbol`, the
//! base/quote legs and `precision`; everything else is carried for callers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Symbol;

/// Market type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    /// Spot market
    #[default]
    Spot,
    /// Margin market
    Margin,
    /// Dated futures
    Future,
    /// Swap/Perpetual market
    Swap,
    /// Options market
    Option,
}

impl std::fmt::Display for MarketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spot => write!(f, "spot"),
            Self::Margin => write!(f, "margin"),
            Self::Future => write!(f, "future"),
            Self::Swap => write!(f, "swap"),
            Self::Option => write!(f, "option"),
        }
    }
}

/// Market precision settings, interpreted per
/// [`PrecisionMode`](super::PrecisionMode).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarketPrecision {
    /// Price precision (decimal places or tick size)
    pub price: Option<Decimal>,
    /// Amount precision (decimal places or step size)
    pub amount: Option<Decimal>,
    /// Base currency precision
    pub base: Option<Decimal>,
    /// Quote currency precision
    pub quote: Option<Decimal>,
}

/// Market structure representing a trading pair
///
/// Missing fields deserialize to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Market {
    /// Exchange-specific market ID
    pub id: String,

    /// Unified symbol (e.g., "BTC/USDT")
    pub symbol: Symbol,

    /// Base currency code (e.g., "BTC")
    pub base: String,

    /// Quote currency code (e.g., "USDT")
    pub quote: String,

    /// Settle currency code (for futures/swaps)
    pub settle: Option<String>,

    /// Base currency ID on exchange
    pub base_id: Option<String>,

    /// Quote currency ID on exchange
    pub quote_id: Option<String>,

    /// Market type
    #[serde(rename = "type")]
    pub market_type: MarketType,

    /// Is market active for trading
    pub active: bool,

    /// Precision settings
    pub precision: MarketPrecision,

    /// Raw exchange info
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub info: HashMap<String, serde_json::Value>,
}

impl Market {
    /// Create a new active spot market.
    pub fn new_spot(
        id: impl Into<String>,
        symbol: impl Into<Symbol>,
        base: impl Into<String>,
        quote: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            base: base.into(),
            quote: quote.into(),
            active: true,
            ..Self::default()
        }
    }

    /// Set the exchange ids of the base and quote legs.
    pub fn with_leg_ids(mut self, base_id: impl Into<String>, quote_id: impl Into<String>) -> Self {
        self.base_id = Some(base_id.into());
        self.quote_id = Some(quote_id.into());
        self
    }

    /// Set the precision block.
    pub fn with_precision(mut self, precision: MarketPrecision) -> Self {
        self.precision = precision;
        self
    }

    /// Check if market is a contract (future/swap/option)
    pub fn is_contract(&self) -> bool {
        matches!(
            self.market_type,
            MarketType::Future | MarketType::Swap | MarketType::Option
        )
    }
}
