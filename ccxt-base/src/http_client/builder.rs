use crate::error::{Error, Result};
use crate::throttler::Throttler;
use reqwest::Client;
use tracing::warn;

use super::config::HttpConfig;

/// Pooled HTTP transport of one exchange instance, optionally gated by its
/// [`Throttler`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
    throttler: Option<Throttler>,
}

impl HttpClient {
    /// Creates a new HTTP client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration does not validate
    /// - The proxy URL is invalid
    /// - The HTTP client cannot be built
    pub fn new(config: HttpConfig) -> Result<Self> {
        for warning in config.validate()? {
            warn!("{warning}");
        }

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .gzip(true)
            .user_agent(&config.user_agent);

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(proxy.to_reqwest()?);
        }

        let client = builder
            .build()
            .map_err(|e| Error::network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            throttler: None,
        })
    }

    /// Creates a new HTTP client gated by `throttler`.
    pub fn new_with_throttler(config: HttpConfig, throttler: Throttler) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.throttler = Some(throttler);
        Ok(client)
    }

    /// Sets the throttler for this client.
    pub fn set_throttler(&mut self, throttler: Throttler) {
        self.throttler = Some(throttler);
    }

    /// The throttler, if configured.
    pub fn throttler(&self) -> Option<&Throttler> {
        self.throttler.as_ref()
    }

    /// Returns a reference to current HTTP configuration.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }
}
