//! Exchange configuration structures and builders

use crate::config::ProxyConfig;
use crate::credentials::{Credentials, SecretString};
use crate::http_client::HttpConfig;
use crate::throttler::ThrottlerConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

/// Exchange configuration
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Exchange identifier, first word of every classified error message
    pub id: String,
    /// Exchange display name
    pub name: String,
    /// Credentials handed to the signer (secrets zeroed on drop)
    pub credentials: Credentials,
    /// Gate every request through the throttler
    pub enable_rate_limit: bool,
    /// Minimum interval between requests of cost 1
    pub rate_limit: Duration,
    /// Explicit token bucket, overriding the one derived from `rate_limit`
    pub token_bucket: Option<ThrottlerConfig>,
    /// Request timeout (default: 30 seconds)
    pub timeout: Duration,
    /// TCP connection timeout (default: 10 seconds)
    pub connect_timeout: Duration,
    /// Custom user agent string
    pub user_agent: Option<String>,
    /// HTTP proxy configuration
    pub proxy: Option<ProxyConfig>,
    /// Log request and response bodies
    pub verbose: bool,
    /// Headers sent with every request, below per-call headers
    pub headers: HeaderMap,
    /// Custom exchange-specific options
    pub options: HashMap<String, Value>,
    /// Base URL overrides per API group, for mocking and testnets
    pub url_overrides: HashMap<String, String>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            credentials: Credentials::default(),
            enable_rate_limit: true,
            rate_limit: Duration::from_millis(2000),
            token_bucket: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: None,
            proxy: None,
            verbose: false,
            headers: HeaderMap::new(),
            options: HashMap::new(),
            url_overrides: HashMap::new(),
        }
    }
}

impl ExchangeConfig {
    /// Create a new configuration builder
    ///
    /// ```rust
    /// use ccxt_base::base_exchange::ExchangeConfig;
    /// use std::time::Duration;
    ///
    /// let config = ExchangeConfig::builder()
    ///     .id("binance")
    ///     .name("Binance")
    ///     .api_key("your-api-key")
    ///     .secret("your-secret")
    ///     .rate_limit(Duration::from_millis(50))
    ///     .build();
    /// assert_eq!(config.throttler_config().refill_rate, 0.02);
    /// ```
    pub fn builder() -> ExchangeConfigBuilder {
        ExchangeConfigBuilder::default()
    }

    /// Token bucket used by this instance.
    pub fn throttler_config(&self) -> ThrottlerConfig {
        self.token_bucket
            .clone()
            .unwrap_or_else(|| ThrottlerConfig::from_rate_limit(self.rate_limit))
    }

    /// Transport settings derived from this configuration.
    pub fn http_config(&self) -> HttpConfig {
        let defaults = HttpConfig::default();
        HttpConfig {
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            verbose: self.verbose,
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            proxy: self.proxy.clone(),
            enable_rate_limit: self.enable_rate_limit,
            ..defaults
        }
    }
}

/// Builder for `ExchangeConfig`
#[derive(Debug, Clone, Default)]
pub struct ExchangeConfigBuilder {
    config: ExchangeConfig,
}

impl ExchangeConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exchange identifier
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.config.id = id.into();
        self
    }

    /// Set the exchange display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the API key for authentication
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.credentials.api_key = Some(SecretString::new(key));
        self
    }

    /// Set the API secret for authentication
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.config.credentials.secret = Some(SecretString::new(secret));
        self
    }

    /// Set the password (required by some exchanges)
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.credentials.password = Some(SecretString::new(password));
        self
    }

    /// Set the user ID (required by some exchanges)
    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.config.credentials.uid = Some(SecretString::new(uid));
        self
    }

    /// Enable or disable rate limiting
    pub fn enable_rate_limit(mut self, enabled: bool) -> Self {
        self.config.enable_rate_limit = enabled;
        self
    }

    /// Set the minimum interval between requests of cost 1
    pub fn rate_limit(mut self, interval: Duration) -> Self {
        self.config.rate_limit = interval;
        self
    }

    /// Set an explicit token bucket
    pub fn token_bucket(mut self, bucket: ThrottlerConfig) -> Self {
        self.config.token_bucket = Some(bucket);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the TCP connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set a custom user agent string
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Set the HTTP proxy configuration
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Set the HTTP proxy URL (convenience method)
    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.config.proxy = Some(ProxyConfig::new(url));
        self
    }

    /// Enable or disable verbose logging
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.config.verbose = enabled;
        self
    }

    /// Add a default header.
    ///
    /// Invalid header names or values are skipped with a warning.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.config.headers.insert(name, value);
            }
            _ => warn!(header = name, "Ignoring invalid default header"),
        }
        self
    }

    /// Set a custom option
    pub fn option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.options.insert(key.into(), value);
        self
    }

    /// Set a URL override for an API group (e.g., "public", "private")
    pub fn url_override(mut self, key: impl Into<String>, url: impl Into<String>) -> Self {
        self.config.url_overrides.insert(key.into(), url.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> ExchangeConfig {
        self.config
    }
}
