//! Request signing seam.
//!
//! An exchange turns `(endpoint, params, headers, body)` into a concrete
//! [`RequestEnvelope`] through [`ExchangeHooks::sign`]. The base supplies
//! [`default_sign`], which only resolves URLs and query strings; exchanges
//! with private endpoints override it and add their authentication.
//!
//! [`ExchangeHooks::sign`]: crate::hooks::ExchangeHooks::sign

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::registry::{EndpointDescriptor, HttpMethod, Params, extract_params, implode_params, value_to_string};
use reqwest::header::HeaderMap;
use std::collections::HashMap;

/// Everything a signer may use to build a request.
#[derive(Debug)]
pub struct SignRequest<'a> {
    /// The endpoint being called.
    pub endpoint: &'a EndpointDescriptor,
    /// Caller parameters, including path placeholders.
    pub params: Params,
    /// Caller headers merged over the configured default headers.
    pub headers: HeaderMap,
    /// Caller-provided body, if any.
    pub body: Option<String>,
    /// Base URL per API group.
    pub urls: &'a HashMap<String, String>,
    /// Instance credentials.
    pub credentials: &'a Credentials,
}

impl SignRequest<'_> {
    /// Base URL of the endpoint's API group.
    pub fn base_url(&self) -> Result<&str> {
        let group = self.endpoint.api_group();
        self.urls.get(group).map(String::as_str).ok_or_else(|| {
            Error::not_supported(format!(
                "No base URL configured for API group '{group}' ({})",
                self.endpoint.name
            ))
        })
    }

    /// Endpoint path with placeholders substituted.
    pub fn path(&self) -> String {
        implode_params(&self.endpoint.path, &self.params)
    }

    /// Parameters not consumed by path placeholders.
    pub fn query_params(&self) -> Params {
        let placeholders = extract_params(&self.endpoint.path);
        self.params
            .iter()
            .filter(|(key, _)| !placeholders.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// `base_url/path`, without query string.
    pub fn url(&self) -> Result<String> {
        let base = self.base_url()?.trim_end_matches('/');
        let path = self.path();
        if path.is_empty() {
            Ok(base.to_string())
        } else {
            Ok(format!("{base}/{}", path.trim_start_matches('/')))
        }
    }
}

/// A fully built HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    /// Absolute URL including any query string.
    pub url: String,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Request headers; `Content-Type` may be among them.
    pub headers: HeaderMap,
    /// Serialized body.
    pub body: Option<String>,
}

impl RequestEnvelope {
    /// Request without headers or body.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// Passthrough signer.
///
/// Resolves the base URL, substitutes path placeholders and, for the
/// `public` group, appends the remaining parameters as a query string.
/// Other groups keep the caller's body and headers untouched.
///
/// ```rust
/// use ccxt_base::credentials::Credentials;
/// use ccxt_base::registry::{EndpointRegistry, Params};
/// use ccxt_base::signer::{SignRequest, default_sign};
/// use reqwest::header::HeaderMap;
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// let registry = EndpointRegistry::build(&json!({"public": {"get": ["ticker/{id}"]}}))?;
/// let urls = HashMap::from([("public".to_string(), "https://api.example.com".to_string())]);
/// let mut params = Params::new();
/// params.insert("id".into(), json!("BTCUSDT"));
/// params.insert("depth".into(), json!(5));
///
/// let request = default_sign(SignRequest {
///     endpoint: registry.require("publicGetTickerId")?,
///     params,
///     headers: HeaderMap::new(),
///     body: None,
///     urls: &urls,
///     credentials: &Credentials::default(),
/// })?;
/// assert_eq!(request.url, "https://api.example.com/ticker/BTCUSDT?depth=5");
/// # Ok::<(), ccxt_base::error::Error>(())
/// ```
pub fn default_sign(request: SignRequest<'_>) -> Result<RequestEnvelope> {
    let mut url = request.url()?;
    if request.endpoint.api_group() == "public" {
        let query = request.query_params();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&urlencode(&query));
        }
    }
    Ok(RequestEnvelope {
        url,
        method: request.endpoint.method,
        headers: request.headers,
        body: request.body,
    })
}

/// Percent-encodes parameters as `key=value&...` in key order.
pub fn urlencode(params: &Params) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&value_to_string(value))
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Millisecond timestamp for use as a request nonce.
pub fn nonce() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
