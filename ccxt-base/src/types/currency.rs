//! Currency type definitions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How an exchange expresses precision values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrecisionMode {
    /// Number of decimal places (`8` means 0.00000001).
    #[default]
    DecimalPlaces,
    /// Number of significant digits.
    SignificantDigits,
    /// Smallest increment (`0.00000001`).
    TickSize,
}

impl PrecisionMode {
    /// Precision assumed for a currency leg that carries none.
    pub fn default_precision(self) -> Decimal {
        match self {
            Self::TickSize => Decimal::new(1, 8),
            Self::DecimalPlaces | Self::SignificantDigits => Decimal::from(8),
        }
    }

    /// True if `candidate` describes finer precision than `current`.
    ///
    /// More places or digits win; in tick-size mode the smaller tick wins.
    pub fn is_finer(self, candidate: Decimal, current: Decimal) -> bool {
        match self {
            Self::TickSize => candidate < current,
            Self::DecimalPlaces | Self::SignificantDigits => candidate > current,
        }
    }
}

impl std::fmt::Display for PrecisionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecimalPlaces => write!(f, "DECIMAL_PLACES"),
            Self::SignificantDigits => write!(f, "SIGNIFICANT_DIGITS"),
            Self::TickSize => write!(f, "TICK_SIZE"),
        }
    }
}

/// A currency as listed by an exchange, or derived from its markets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Currency {
    /// Unified currency code (e.g., "BTC", "USDT")
    pub code: String,

    /// Exchange-specific currency ID
    pub id: String,

    /// Full currency name
    pub name: Option<String>,

    /// Is currency active
    pub active: bool,

    /// Precision, interpreted per [`PrecisionMode`]
    pub precision: Option<Decimal>,

    /// Raw exchange info
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub info: HashMap<String, serde_json::Value>,
}

impl Currency {
    /// Create a new active currency.
    pub fn new(code: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            id: id.into(),
            name: None,
            active: true,
            precision: None,
            info: HashMap::new(),
        }
    }

    /// Set the precision.
    pub fn with_precision(mut self, precision: Decimal) -> Self {
        self.precision = Some(precision);
        self
    }
}
