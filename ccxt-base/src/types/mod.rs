//! Exchange metadata cached by the market loader.

pub mod currency;
pub mod market;

pub use currency::{Currency, PrecisionMode};
pub use market::{Market, MarketPrecision, MarketType};

/// Unified symbol such as `BTC/USDT` or `BTC/USDT:USDT`.
pub type Symbol = String;
