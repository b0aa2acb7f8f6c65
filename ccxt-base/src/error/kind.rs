//! Fieldless classification tag for [`Error`](super::Error).

use std::fmt;

/// Failure class of an [`Error`](super::Error).
///
/// The names follow the unified exception names used across exchange clients
/// (`AuthenticationError`, `RateLimitExceeded`, `DDoSProtection`, ...), see
/// [`ErrorKind::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Generic exchange-reported error.
    Exchange,
    /// Credentials rejected.
    Authentication,
    /// Too many requests.
    RateLimitExceeded,
    /// Blocked by DDoS protection.
    DdosProtection,
    /// Exchange down, on maintenance, or unreachable.
    ExchangeNotAvailable,
    /// Timed out at the exchange, a gateway, or the transport.
    RequestTimeout,
    /// Throttle queue over capacity.
    AdmissionRejected,
    /// Bad arguments.
    InvalidRequest,
    /// Unknown market or currency.
    BadSymbol,
    /// Endpoint or capability not available.
    NotSupported,
    /// Response could not be decoded.
    Parse,
}

impl ErrorKind {
    /// Unified exception name for this kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exchange => "ExchangeError",
            Self::Authentication => "AuthenticationError",
            Self::RateLimitExceeded => "RateLimitExceeded",
            Self::DdosProtection => "DDoSProtection",
            Self::ExchangeNotAvailable => "ExchangeNotAvailable",
            Self::RequestTimeout => "RequestTimeout",
            Self::AdmissionRejected => "AdmissionRejected",
            Self::InvalidRequest => "BadRequest",
            Self::BadSymbol => "BadSymbol",
            Self::NotSupported => "NotSupported",
            Self::Parse => "BadResponse",
        }
    }

    /// Kinds that describe the path to the exchange rather than the request.
    ///
    /// These are the kinds a caller may reasonably retry after backing off.
    pub const fn is_network(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded
                | Self::DdosProtection
                | Self::ExchangeNotAvailable
                | Self::RequestTimeout
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
