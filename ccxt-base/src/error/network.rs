//! Network-related error types.

use thiserror::Error;

/// Transport-level failures, hiding the HTTP library's own error types.
///
/// Only failures that happen before a status line is received land here;
/// an HTTP response with any status is a [`ResponseEnvelope`] and goes through
/// the classifier instead.
///
/// [`ResponseEnvelope`]: crate::http_client::ResponseEnvelope
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NetworkError {
    /// The transport gave up waiting for the exchange.
    #[error("Request timeout")]
    Timeout,

    /// Connection could not be established.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Response body exceeded the configured size limit.
    #[error("Response size {size} bytes exceeds limit {limit} bytes")]
    ResponseTooLarge {
        /// Bytes received (or announced) so far
        size: u64,
        /// Configured maximum
        limit: usize,
    },

    /// Any other transport failure (body read, redirect loop, TLS).
    #[error("Transport error: {0}")]
    Transport(String),
}
