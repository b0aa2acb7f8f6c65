//! # Error Handling for the dispatch layer
//!
//! Every failure produced by the registry, the throttler, the HTTP dispatcher,
//! the response classifier and the market loader is an [`Error`]. Callers
//! branch on the failure class with [`Error::kind`] instead of string matching:
//!
//! ```text
//! Error
//! ├── Exchange             - exchange-reported failure (sentinel codes, 422)
//! ├── Network              - transport failure (via NetworkError)
//! ├── Authentication       - 401 / 407 / 511, bad keys or signatures
//! ├── RateLimit            - 429 with optional retry hint
//! ├── DdosProtection       - 418, cloudflare/incapsula pages
//! ├── ExchangeNotAvailable - maintenance, 5xx, gateway errors
//! ├── RequestTimeout       - 408 / 504
//! ├── AdmissionRejected    - throttle queue over capacity
//! ├── InvalidRequest       - bad arguments
//! ├── BadSymbol            - unknown market or currency
//! ├── NotSupported         - unknown endpoint, missing hook
//! ├── Parse                - response decoding (via ParseError)
//! └── Context              - error with additional context
//! ```
//!
//! ## Matching on kind
//!
//! ```rust
//! use ccxt_base::error::{Error, ErrorKind};
//!
//! fn should_back_off(err: &Error) -> bool {
//!     matches!(
//!         err.kind(),
//!         ErrorKind::RateLimitExceeded | ErrorKind::DdosProtection
//!     )
//! }
//!
//! let err = Error::rate_limit("binance GET https://api.binance.com 429", None)
//!     .context("fetching ticker");
//! assert!(should_back_off(&err));
//! ```
//!
//! `Error` is `Clone` so a single failed market load can be handed to every
//! task awaiting it.

mod context;
mod convert;
mod details;
mod kind;
mod network;
mod parse;

use std::borrow::Cow;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

pub use context::ContextExt;
pub use details::ExchangeErrorDetails;
pub use kind::ErrorKind;
pub use network::NetworkError;
pub use parse::ParseError;

pub(crate) use convert::truncate_message;

/// Result type alias for all dispatch-layer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The primary error type of the dispatch layer.
///
/// Large variants are boxed to keep the enum small, string payloads use
/// `Cow<'static, str>` so static messages do not allocate.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Exchange-specific errors returned by the exchange API.
    #[error("Exchange error: {0}")]
    Exchange(Box<ExchangeErrorDetails>),

    /// Transport-level failure (connection refused, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Network(Box<NetworkError>),

    /// Authentication errors (invalid API key, signature, etc.).
    #[error("Authentication error: {0}")]
    Authentication(Cow<'static, str>),

    /// Rate limit exceeded with optional retry information.
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        /// Error message
        message: Cow<'static, str>,
        /// Optional duration to wait before retrying
        retry_after: Option<Duration>,
    },

    /// Request blocked by DDoS protection in front of the exchange.
    #[error("DDoS protection: {0}")]
    DdosProtection(Cow<'static, str>),

    /// Exchange is down, overloaded or on maintenance.
    #[error("Exchange not available: {0}")]
    ExchangeNotAvailable(Cow<'static, str>),

    /// The exchange or a gateway reported a timeout.
    #[error("Request timeout: {0}")]
    RequestTimeout(Cow<'static, str>),

    /// The throttle queue was over capacity; the call was never enqueued.
    #[error("Throttle queue is over capacity ({queued} queued, max {max_queue_depth})")]
    AdmissionRejected {
        /// Tickets already waiting when the call was rejected
        queued: usize,
        /// Configured maximum queue depth
        max_queue_depth: usize,
    },

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(Cow<'static, str>),

    /// Market symbol or currency code not found.
    #[error("Bad symbol: {0}")]
    BadSymbol(Cow<'static, str>),

    /// Endpoint or capability not supported by this exchange.
    #[error("Not supported: {0}")]
    NotSupported(Cow<'static, str>),

    /// Errors during response decoding.
    #[error("Parse error: {0}")]
    Parse(Box<ParseError>),

    /// Error with additional context, preserving the error chain.
    #[error("{context}")]
    Context {
        /// Context message describing what operation failed
        context: String,
        /// The underlying error
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    // ==================== Constructor Methods ====================

    /// Creates a new exchange error.
    ///
    /// ```rust
    /// use ccxt_base::error::Error;
    ///
    /// let err = Error::exchange("-1121", "Invalid symbol");
    /// ```
    pub fn exchange(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Exchange(Box::new(ExchangeErrorDetails::new(code, message)))
    }

    /// Creates a new exchange error carrying the raw response payload.
    pub fn exchange_with_data(
        code: impl Into<String>,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self::Exchange(Box::new(ExchangeErrorDetails::with_data(
            code, message, data,
        )))
    }

    /// Creates a new rate limit error with optional retry duration.
    pub fn rate_limit(
        message: impl Into<Cow<'static, str>>,
        retry_after: Option<Duration>,
    ) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Creates a DDoS protection error.
    pub fn ddos_protection(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::DdosProtection(msg.into())
    }

    /// Creates an exchange-not-available error.
    pub fn exchange_not_available(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::ExchangeNotAvailable(msg.into())
    }

    /// Creates a request timeout error.
    pub fn request_timeout(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::RequestTimeout(msg.into())
    }

    /// Creates an admission-rejected error for a full throttle queue.
    pub fn admission_rejected(queued: usize, max_queue_depth: usize) -> Self {
        Self::AdmissionRejected {
            queued,
            max_queue_depth,
        }
    }

    /// Creates a network error from a message.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(Box::new(NetworkError::ConnectionFailed(msg.into())))
    }

    /// Creates an invalid request error.
    pub fn invalid_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Creates a bad symbol error.
    pub fn bad_symbol(symbol: impl Into<Cow<'static, str>>) -> Self {
        Self::BadSymbol(symbol.into())
    }

    /// Creates a not supported error.
    pub fn not_supported(feature: impl Into<Cow<'static, str>>) -> Self {
        Self::NotSupported(feature.into())
    }

    /// Builds the error variant that corresponds to `kind`.
    ///
    /// Used by the response classifier and by exchange error-code tables,
    /// which only know the kind and a message. An admission rejection only
    /// comes from the throttler, so that kind becomes a generic exchange
    /// error carrying the message.
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Exchange | ErrorKind::AdmissionRejected => {
                Self::exchange(ErrorKind::Exchange.as_str(), message)
            }
            ErrorKind::Authentication => Self::authentication(message),
            ErrorKind::RateLimitExceeded => Self::rate_limit(message, None),
            ErrorKind::DdosProtection => Self::ddos_protection(message),
            ErrorKind::ExchangeNotAvailable => Self::exchange_not_available(message),
            ErrorKind::RequestTimeout => Self::request_timeout(message),
            ErrorKind::InvalidRequest => Self::invalid_request(message),
            ErrorKind::BadSymbol => Self::bad_symbol(message),
            ErrorKind::NotSupported => Self::not_supported(message),
            ErrorKind::Parse => Self::from(ParseError::invalid_value("response", message)),
        }
    }

    // ==================== Context Methods ====================

    /// Attaches context to an existing error.
    ///
    /// ```rust
    /// use ccxt_base::error::Error;
    ///
    /// let err = Error::network("Connection refused")
    ///     .context("Failed to fetch ticker for BTC/USDT");
    /// ```
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    fn iter_chain(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(Some(self), |err| match err {
            Error::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        })
    }

    /// Returns the root cause of the error, skipping Context layers.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        self.iter_chain().last().unwrap_or(self)
    }

    /// Returns the classification tag of this error (penetrates Context layers).
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self.root_cause() {
            Error::Exchange(_) | Error::Context { .. } => ErrorKind::Exchange,
            Error::Network(ne) => match ne.as_ref() {
                NetworkError::Timeout => ErrorKind::RequestTimeout,
                _ => ErrorKind::ExchangeNotAvailable,
            },
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::RateLimit { .. } => ErrorKind::RateLimitExceeded,
            Error::DdosProtection(_) => ErrorKind::DdosProtection,
            Error::ExchangeNotAvailable(_) => ErrorKind::ExchangeNotAvailable,
            Error::RequestTimeout(_) => ErrorKind::RequestTimeout,
            Error::AdmissionRejected { .. } => ErrorKind::AdmissionRejected,
            Error::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Error::BadSymbol(_) => ErrorKind::BadSymbol,
            Error::NotSupported(_) => ErrorKind::NotSupported,
            Error::Parse(_) => ErrorKind::Parse,
        }
    }

    /// Generates a detailed error report with the full chain.
    #[must_use]
    pub fn report(&self) -> String {
        use std::fmt::Write;
        let mut report = String::new();
        report.push_str(&self.to_string());

        let mut current: Option<&(dyn StdError + 'static)> = self.source();
        while let Some(err) = current {
            let _ = write!(report, "\nCaused by: {err}");
            current = err.source();
        }
        report
    }

    // ==================== Helper Methods (Context Penetrating) ====================

    /// Checks if a later attempt of the same call may succeed.
    ///
    /// Nothing in this crate retries; the flag is for callers deciding on
    /// their own backoff. `AdmissionRejected` is not retryable: the caller is
    /// producing faster than the bucket drains and has to slow down first.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_network()
    }

    /// Returns the retry delay if this is a rate limit error (penetrates Context layers).
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self.root_cause() {
            Error::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Returns the message of an authentication error (penetrates Context layers).
    #[must_use]
    pub fn as_authentication(&self) -> Option<&str> {
        match self.root_cause() {
            Error::Authentication(msg) => Some(msg.as_ref()),
            _ => None,
        }
    }

    /// Returns the exchange error details, if any (penetrates Context layers).
    #[must_use]
    pub fn as_exchange(&self) -> Option<&ExchangeErrorDetails> {
        match self.root_cause() {
            Error::Exchange(details) => Some(details),
            _ => None,
        }
    }
}
