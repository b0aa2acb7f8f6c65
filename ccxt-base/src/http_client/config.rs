use crate::config::ProxyConfig;
use crate::error::{Error, Result};
use std::time::Duration;

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Duration,
    /// TCP connection timeout (default: 10 seconds)
    pub connect_timeout: Duration,
    /// Log request and response bodies at `debug`
    pub verbose: bool,
    /// Default User-Agent header value
    pub user_agent: String,
    /// Optional proxy configuration
    pub proxy: Option<ProxyConfig>,
    /// Whether dispatches wait for the throttler
    pub enable_rate_limit: bool,
    /// Maximum response body size in bytes (default: 10MB)
    pub max_response_size: usize,
    /// Maximum request body size in bytes (default: 10MB)
    ///
    /// Oversized bodies are rejected before anything is sent.
    pub max_request_size: usize,
    /// Maximum number of idle connections per host in the connection pool.
    ///
    /// Default: 10
    pub pool_max_idle_per_host: usize,
    /// Timeout for idle connections in the pool.
    ///
    /// Default: 90 seconds
    pub pool_idle_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            verbose: false,
            user_agent: concat!("ccxt-base/", env!("CARGO_PKG_VERSION")).to_string(),
            proxy: None,
            enable_rate_limit: true,
            max_response_size: 10 * 1024 * 1024,
            max_request_size: 10 * 1024 * 1024,
            pool_max_idle_per_host: 10,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl HttpConfig {
    /// Validates the configuration.
    ///
    /// Returns warnings for suboptimal but usable settings, and an
    /// `InvalidRequest` error for unusable ones:
    ///
    /// - zero `timeout` or `connect_timeout`
    /// - zero or above-100MB size limits
    ///
    /// A `timeout` above 5 minutes or below 1 second is only a warning.
    ///
    /// ```rust
    /// use ccxt_base::http_client::HttpConfig;
    /// use std::time::Duration;
    ///
    /// assert!(HttpConfig::default().validate().is_ok());
    ///
    /// let config = HttpConfig {
    ///     timeout: Duration::from_secs(600),
    ///     ..Default::default()
    /// };
    /// assert_eq!(config.validate().unwrap().len(), 1);
    /// ```
    pub fn validate(&self) -> Result<Vec<String>> {
        const MAX_REASONABLE_SIZE: usize = 100 * 1024 * 1024;
        const MAX_TIMEOUT: Duration = Duration::from_secs(300);

        let mut warnings = Vec::new();

        if self.timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(Error::invalid_request("timeouts must be greater than zero"));
        }
        if self.timeout > MAX_TIMEOUT {
            warnings.push(format!("timeout {:?} exceeds 5 minutes", self.timeout));
        }
        if self.timeout < Duration::from_secs(1) {
            warnings.push(format!(
                "timeout {:?} is very short, may cause frequent timeouts",
                self.timeout
            ));
        }

        for (field, size) in [
            ("max_request_size", self.max_request_size),
            ("max_response_size", self.max_response_size),
        ] {
            if size == 0 {
                return Err(Error::invalid_request(format!("{field} cannot be zero")));
            }
            if size > MAX_REASONABLE_SIZE {
                return Err(Error::invalid_request(format!(
                    "{field} {size} exceeds 100MB (104857600 bytes)"
                )));
            }
        }

        Ok(warnings)
    }
}
