use crate::error::{Error, NetworkError, Result};
use futures::StreamExt;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use super::builder::HttpClient;
use super::headers::headers_to_json;

const BODY_PREVIEW_SIZE: usize = 200;

/// Everything captured from one HTTP exchange, whatever its status.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase, empty for non-standard codes.
    pub status_text: String,
    /// Response headers.
    pub headers: HeaderMap,
    /// Body as text (lossy UTF-8).
    pub raw_body: String,
    /// Parsed JSON body, or the raw text as a JSON string.
    pub body: Value,
    /// True if `raw_body` parsed as JSON.
    pub is_json: bool,
}

impl ResponseEnvelope {
    /// Builds an envelope, parsing the body as JSON when possible.
    pub fn new(status: u16, headers: HeaderMap, raw_body: impl Into<String>) -> Self {
        let raw_body = raw_body.into();
        let (body, is_json) = match serde_json::from_str::<Value>(&raw_body) {
            Ok(value) => (value, true),
            Err(_) => (Value::String(raw_body.clone()), false),
        };
        let status_text = StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            status_text,
            headers,
            raw_body,
            body,
            is_json,
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// A header value as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `Retry-After` in seconds, if present and numeric.
    pub fn retry_after(&self) -> Option<Duration> {
        self.header(RETRY_AFTER.as_str())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Headers as a JSON object.
    pub fn headers_json(&self) -> Value {
        headers_to_json(&self.headers)
    }
}

impl HttpClient {
    #[instrument(name = "http_read_response", skip(self, response), fields(status, url = %url))]
    pub(crate) async fn read_response(
        &self,
        response: Response,
        url: &str,
    ) -> Result<ResponseEnvelope> {
        let status = response.status();
        let headers = response.headers().clone();
        let max_size = self.config().max_response_size;

        tracing::Span::current().record("status", status.as_u16());

        if let Some(content_length) = response.content_length()
            && content_length > max_size as u64
        {
            warn!(
                url = %url,
                content_length = content_length,
                max_size = max_size,
                "Response exceeds size limit (Content-Length check)"
            );
            return Err(NetworkError::ResponseTooLarge {
                size: content_length,
                limit: max_size,
            }
            .into());
        }

        let body_bytes = self.stream_response_with_limit(response, url, max_size).await?;
        let raw_body = String::from_utf8_lossy(&body_bytes).into_owned();

        let body_preview: String = raw_body.chars().take(BODY_PREVIEW_SIZE).collect();
        debug!(
            status = %status,
            body_length = body_bytes.len(),
            body_preview = %body_preview,
            "HTTP response received"
        );
        if self.config().verbose {
            debug!(headers = ?headers, body = %raw_body, "HTTP response");
        }

        Ok(ResponseEnvelope::new(status.as_u16(), headers, raw_body))
    }

    async fn stream_response_with_limit(
        &self,
        response: Response,
        url: &str,
        max_size: usize,
    ) -> Result<Vec<u8>> {
        #[allow(clippy::cast_possible_truncation)]
        let initial_capacity = response
            .content_length()
            .map_or(64 * 1024, |len| std::cmp::min(len as usize, max_size));

        let mut stream = response.bytes_stream();
        let mut body = Vec::with_capacity(initial_capacity);

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| {
                error!(error = %e, "Failed to read response chunk");
                Error::from(e)
            })?;

            let accumulated_size = body.len().saturating_add(chunk.len());
            if accumulated_size > max_size {
                warn!(
                    url = %url,
                    accumulated_size = accumulated_size,
                    max_size = max_size,
                    "Response exceeds size limit during streaming"
                );
                return Err(NetworkError::ResponseTooLarge {
                    size: accumulated_size as u64,
                    limit: max_size,
                }
                .into());
            }

            body.extend_from_slice(&chunk);
        }

        if body.capacity() > body.len() + body.len() / 4 {
            body.shrink_to_fit();
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_envelope_parses_json() {
        let envelope = ResponseEnvelope::new(200, HeaderMap::new(), r#"{"price":"1.5"}"#);
        assert!(envelope.is_json);
        assert!(envelope.is_success());
        assert_eq!(envelope.status_text, "OK");
        assert_eq!(envelope.body["price"], "1.5");
    }

    #[test]
    fn test_envelope_falls_back_to_text() {
        let envelope = ResponseEnvelope::new(503, HeaderMap::new(), "<html>down</html>");
        assert!(!envelope.is_json);
        assert!(!envelope.is_success());
        assert_eq!(envelope.status_text, "Service Unavailable");
        assert_eq!(envelope.body, Value::String("<html>down</html>".into()));
    }

    #[test]
    fn test_retry_after_header() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("7"));
        let envelope = ResponseEnvelope::new(429, headers, "");
        assert_eq!(envelope.retry_after(), Some(Duration::from_secs(7)));
        assert_eq!(envelope.headers_json()["retry-after"], "7");
    }

    #[test]
    fn test_non_standard_status_has_empty_reason() {
        let envelope = ResponseEnvelope::new(599, HeaderMap::new(), "");
        assert_eq!(envelope.status_text, "");
    }
}
