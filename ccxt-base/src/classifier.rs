//! Response classification.
//!
//! Turns a [`ResponseEnvelope`] into `Ok(())` or one typed [`Error`]. The
//! exchange's own [`handle_errors`] hook runs first and wins; the default
//! classifier then applies, in order:
//!
//! 1. the HTTP status table (non-2xx only), upgrading `ExchangeNotAvailable`
//!    to `DdosProtection` when the body names a DDoS shield;
//! 2. a keyword heuristic for bodies that look like JSON but do not parse
//!    (truncated or replaced by a proxy page).
//!
//! Non-2xx statuses missing from the table pass through unclassified.
//!
//! [`handle_errors`]: crate::hooks::ExchangeHooks::handle_errors

use crate::error::{Error, ErrorKind, Result, truncate_message};
use crate::hooks::ExchangeHooks;
use crate::http_client::ResponseEnvelope;
use crate::registry::HttpMethod;
use reqwest::header::HeaderMap;
use std::collections::HashMap;
use tracing::{debug, warn};

const DDOS_KEYWORDS: &[&str] = &["cloudflare", "incapsula", "overload", "ddos"];

const UNAVAILABLE_KEYWORDS: &[&str] = &[
    "offline",
    "busy",
    "retry",
    "wait",
    "unavailable",
    "maintain",
    "maintenance",
    "maintenancing",
];

/// A request/response pair handed to classifiers.
#[derive(Debug, Clone, Copy)]
pub struct ResponseContext<'a> {
    /// Exchange id, first word of every classified message.
    pub exchange_id: &'a str,
    /// Request verb.
    pub method: HttpMethod,
    /// Request URL.
    pub url: &'a str,
    /// Request headers as sent.
    pub request_headers: &'a HeaderMap,
    /// Request body as sent.
    pub request_body: Option<&'a str>,
    /// What came back.
    pub response: &'a ResponseEnvelope,
}

impl ResponseContext<'_> {
    /// `"{id} {method} {url} {status} {reason} {body}"`, truncated.
    pub fn message(&self) -> String {
        truncate_message(format!(
            "{} {} {} {} {} {}",
            self.exchange_id,
            self.method,
            self.url,
            self.response.status,
            self.response.status_text,
            self.response.raw_body
        ))
    }
}

/// Error kind the status table assigns to `status`, if any.
pub fn status_kind(status: u16) -> Option<ErrorKind> {
    match status {
        401 | 407 | 511 => Some(ErrorKind::Authentication),
        429 => Some(ErrorKind::RateLimitExceeded),
        418 => Some(ErrorKind::DdosProtection),
        408 | 504 => Some(ErrorKind::RequestTimeout),
        422 => Some(ErrorKind::Exchange),
        400 | 403 | 404 | 405 | 409 | 410 | 451 | 500 | 501 | 502 | 503 | 520 | 521 | 522
        | 525 | 526 | 530 => Some(ErrorKind::ExchangeNotAvailable),
        _ => None,
    }
}

/// Runs the exchange override, then the default classifier.
pub fn classify(hooks: &dyn ExchangeHooks, ctx: &ResponseContext<'_>) -> Result<()> {
    hooks.handle_errors(ctx)?;
    default_classify(ctx)
}

/// The exchange-independent classifier.
///
/// ```rust
/// use ccxt_base::classifier::{ResponseContext, default_classify};
/// use ccxt_base::error::ErrorKind;
/// use ccxt_base::http_client::ResponseEnvelope;
/// use ccxt_base::registry::HttpMethod;
/// use reqwest::header::HeaderMap;
///
/// let response = ResponseEnvelope::new(429, HeaderMap::new(), "slow down");
/// let headers = HeaderMap::new();
/// let ctx = ResponseContext {
///     exchange_id: "binance",
///     method: HttpMethod::Get,
///     url: "https://api.binance.com/api/v3/time",
///     request_headers: &headers,
///     request_body: None,
///     response: &response,
/// };
/// let err = default_classify(&ctx).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
/// ```
pub fn default_classify(ctx: &ResponseContext<'_>) -> Result<()> {
    let response = ctx.response;

    if !response.is_success() {
        match status_kind(response.status) {
            Some(kind) => {
                let kind = if kind == ErrorKind::ExchangeNotAvailable
                    && contains_any(&response.raw_body, DDOS_KEYWORDS)
                {
                    ErrorKind::DdosProtection
                } else {
                    kind
                };
                let err = match kind {
                    ErrorKind::RateLimitExceeded => {
                        Error::rate_limit(ctx.message(), response.retry_after())
                    }
                    ErrorKind::Exchange => Error::exchange_with_data(
                        response.status.to_string(),
                        ctx.message(),
                        response.body.clone(),
                    ),
                    other => Error::from_kind(other, ctx.message()),
                };
                warn!(
                    exchange = ctx.exchange_id,
                    status = response.status,
                    kind = %kind,
                    "HTTP error response"
                );
                return Err(err);
            }
            None => debug!(
                exchange = ctx.exchange_id,
                status = response.status,
                "Unmapped HTTP status, passing response through"
            ),
        }
    }

    if !response.is_json && looks_like_json(&response.raw_body) {
        let body = &response.raw_body;
        let prefix = format!("{} {} {}", ctx.exchange_id, ctx.method, ctx.url);
        let err = if contains_any(body, DDOS_KEYWORDS) {
            Error::ddos_protection(truncate_message(format!("{prefix} {body}")))
        } else if contains_any(body, UNAVAILABLE_KEYWORDS) {
            Error::exchange_not_available(truncate_message(format!(
                "{prefix} {body} exchange downtime, exchange closed for maintenance or offline, \
                 DDoS protection or rate-limiting in effect"
            )))
        } else {
            Error::exchange(
                ErrorKind::Exchange.as_str(),
                truncate_message(format!("{prefix} {body}")),
            )
        };
        warn!(exchange = ctx.exchange_id, kind = %err.kind(), "Malformed JSON response");
        return Err(err);
    }

    Ok(())
}

fn looks_like_json(body: &str) -> bool {
    let trimmed = body.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let haystack = haystack.to_lowercase();
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Exchange error-code table.
///
/// Exact entries match an error code or message verbatim; broad entries match
/// when their fragment occurs anywhere in the text. Exact matches are checked
/// first.
///
/// ```rust
/// use ccxt_base::classifier::ErrorCodeMap;
/// use ccxt_base::error::ErrorKind;
///
/// let codes = ErrorCodeMap::new()
///     .exact("-1121", ErrorKind::BadSymbol)
///     .exact("-2015", ErrorKind::Authentication)
///     .broad("Too many requests", ErrorKind::RateLimitExceeded);
///
/// let err = codes
///     .check(Some("-1121"), "Invalid symbol.", "binance -1121 Invalid symbol.")
///     .unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::BadSymbol);
/// assert!(codes.check(Some("0"), "ok", "fine").is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ErrorCodeMap {
    exact: HashMap<String, ErrorKind>,
    broad: Vec<(String, ErrorKind)>,
}

impl ErrorCodeMap {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an exact entry.
    pub fn exact(mut self, key: impl Into<String>, kind: ErrorKind) -> Self {
        self.exact.insert(key.into(), kind);
        self
    }

    /// Adds a substring entry.
    pub fn broad(mut self, fragment: impl Into<String>, kind: ErrorKind) -> Self {
        self.broad.push((fragment.into(), kind));
        self
    }

    /// Kind for an exact `key`.
    pub fn exactly_matched(&self, key: &str) -> Option<ErrorKind> {
        self.exact.get(key).copied()
    }

    /// Kind of the first broad entry found in `text`.
    pub fn broadly_matched(&self, text: &str) -> Option<ErrorKind> {
        self.broad
            .iter()
            .find(|(fragment, _)| text.contains(fragment.as_str()))
            .map(|(_, kind)| *kind)
    }

    /// Fails with the mapped error if `code` or `text` matches an entry.
    ///
    /// `code` and `text` are tried exactly, then `text` broadly. `message`
    /// becomes the error message.
    pub fn check(&self, code: Option<&str>, text: &str, message: &str) -> Result<()> {
        let matched = code
            .and_then(|code| self.exactly_matched(code).map(|kind| (code, kind)))
            .or_else(|| self.exactly_matched(text).map(|kind| (text, kind)))
            .or_else(|| self.broadly_matched(text).map(|kind| (text, kind)));

        match matched {
            Some((key, ErrorKind::Exchange)) => Err(Error::exchange(key, message)),
            Some((_, kind)) => Err(Error::from_kind(kind, message)),
            None => Ok(()),
        }
    }
}
