//! Error detail structures.

use serde_json::Value;

/// Details for exchange-specific errors.
///
/// Boxed inside [`Error::Exchange`](super::Error::Exchange) to keep the enum small.
///
/// ```rust
/// use ccxt_base::error::ExchangeErrorDetails;
///
/// let details = ExchangeErrorDetails::new("400", "Bad Request");
/// assert_eq!(details.code, "400");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct ExchangeErrorDetails {
    /// Error code as String to support all exchange formats (numeric, alphanumeric).
    pub code: String,
    /// Descriptive message from the exchange.
    pub message: String,
    /// Optional raw response data for debugging.
    pub data: Option<Value>,
}

impl ExchangeErrorDetails {
    /// Creates a new `ExchangeErrorDetails` with the given code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Creates a new `ExchangeErrorDetails` with raw response data.
    pub fn with_data(code: impl Into<String>, message: impl Into<String>, data: Value) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl std::fmt::Display for ExchangeErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)
    }
}
