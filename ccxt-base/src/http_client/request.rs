use crate::error::{Error, Result};
use crate::signer::RequestEnvelope;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use tracing::{debug, error, instrument};

use super::builder::HttpClient;
use super::headers::split_content_type;
use super::response::ResponseEnvelope;

impl HttpClient {
    /// Waits for the throttler (when rate limiting is enabled), then performs
    /// exactly one HTTP exchange.
    ///
    /// `cost` is the endpoint's rate-limit cost.
    #[instrument(
        name = "http_dispatch",
        skip(self, request),
        fields(method = %request.method, url = %request.url)
    )]
    pub async fn dispatch(&self, request: &RequestEnvelope, cost: f64) -> Result<ResponseEnvelope> {
        if self.config().enable_rate_limit
            && let Some(throttler) = self.throttler()
        {
            throttler.throttle(Some(cost)).await?;
        }
        self.fetch(request).await
    }

    /// Sends `request` once, without throttling or retries.
    ///
    /// Any HTTP status yields a [`ResponseEnvelope`]; only transport failures
    /// (connect, TLS, timeout, oversized body) are errors.
    ///
    /// `Content-Type` is taken from the request headers case-insensitively
    /// and defaults to `application/json`; it is only sent with a body.
    #[instrument(
        name = "http_fetch",
        skip(self, request),
        fields(method = %request.method, url = %request.url, has_body = request.body.is_some())
    )]
    pub async fn fetch(&self, request: &RequestEnvelope) -> Result<ResponseEnvelope> {
        let (headers, content_type) = split_content_type(&request.headers);
        let mut builder = self
            .client()
            .request(request.method.to_reqwest(), &request.url)
            .headers(headers);

        if let Some(body) = &request.body {
            let max_request_size = self.config().max_request_size;
            if body.len() > max_request_size {
                return Err(Error::invalid_request(format!(
                    "Request body {} bytes exceeds limit {max_request_size} bytes",
                    body.len()
                )));
            }
            let content_type =
                content_type.unwrap_or_else(|| HeaderValue::from_static("application/json"));
            builder = builder.header(CONTENT_TYPE, content_type).body(body.clone());
        }

        if self.config().verbose {
            debug!(
                headers = ?request.headers,
                body = request.body.as_deref().unwrap_or_default(),
                "HTTP request"
            );
        }

        let response = builder.send().await.map_err(|e| {
            error!(error = %e, "HTTP request send failed");
            Error::from(e)
        })?;

        self.read_response(response, &request.url).await
    }
}
