//! Attaching context to fallible calls.

use crate::error::{Error, Result};
use std::fmt::Display;

/// Wraps the error of a `Result` in an [`Error::Context`] layer.
///
/// The [`ErrorKind`](crate::error::ErrorKind) of the wrapped error is kept,
/// so callers matching on `kind()` see through the added message.
///
/// ```rust
/// use ccxt_base::error::{ContextExt, Error, ErrorKind, Result};
///
/// fn fetch() -> Result<()> {
///     Err(Error::ddos_protection("cloudflare"))
/// }
///
/// let err = fetch().with_context(|| "binance fetch_markets").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::DdosProtection);
/// assert!(err.to_string().starts_with("binance fetch_markets"));
/// ```
pub trait ContextExt<T> {
    /// Wraps the error with a fixed message.
    fn context(self, message: impl Display) -> Result<T>;

    /// Wraps the error with a message built only on failure.
    fn with_context<C: Display>(self, message: impl FnOnce() -> C) -> Result<T>;
}

impl<T, E: Into<Error>> ContextExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Display) -> Result<T> {
        self.with_context(|| message)
    }

    fn with_context<C: Display>(self, message: impl FnOnce() -> C) -> Result<T> {
        self.map_err(|e| e.into().context(message().to_string()))
    }
}
