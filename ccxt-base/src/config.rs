//! Transport configuration shared by the exchange config and the HTTP client.

use crate::error::{Error, Result};

/// Outbound proxy for every request of one exchange instance.
///
/// `http://`, `https://` and `socks5://` URLs are accepted; credentials are
/// sent as proxy basic auth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy URL (e.g., "http://127.0.0.1:8080").
    pub url: String,
    /// Optional username for authentication.
    pub username: Option<String>,
    /// Optional password for authentication.
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Create a new proxy configuration with just a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// Set credentials for the proxy.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Builds the `reqwest` proxy applied to all schemes.
    pub(crate) fn to_reqwest(&self) -> Result<reqwest::Proxy> {
        let mut proxy = reqwest::Proxy::all(&self.url)
            .map_err(|e| Error::invalid_request(format!("Invalid proxy URL {}: {e}", self.url)))?;
        if let Some(username) = &self.username {
            proxy = proxy.basic_auth(username, self.password.as_deref().unwrap_or_default());
        }
        Ok(proxy)
    }
}
