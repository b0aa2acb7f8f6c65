//! Request pipeline: sign, throttle, send, classify.

use crate::classifier::{self, ResponseContext};
use crate::error::Result;
use crate::http_client::{ResponseEnvelope, merge_headers};
use crate::registry::{EndpointDescriptor, Params};
use crate::signer::{RequestEnvelope, SignRequest};
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::BaseExchange;

/// Outcome of one endpoint call.
///
/// The request and response are kept alongside the parsed body for
/// diagnostics.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// The endpoint that was called.
    pub endpoint: Arc<EndpointDescriptor>,
    /// The request as sent.
    pub request: RequestEnvelope,
    /// The response as received.
    pub response: ResponseEnvelope,
    /// Parsed JSON body, or the raw text as a JSON string.
    pub data: Value,
}

impl ApiResponse {
    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.response.status
    }
}

impl BaseExchange {
    /// Calls a named endpoint and classifies the response.
    ///
    /// `name` is any accessor name of the endpoint (`publicGetTicker` or
    /// `public_get_ticker`).
    pub async fn request(&self, name: &str, params: Params) -> Result<ApiResponse> {
        self.request_with(name, params, HeaderMap::new(), None).await
    }

    /// Like [`request`](Self::request), with per-call headers and body.
    pub async fn request_with(
        &self,
        name: &str,
        params: Params,
        headers: HeaderMap,
        body: Option<String>,
    ) -> Result<ApiResponse> {
        let response = self.fetch_raw(name, params, headers, body).await?;
        self.classify(&response.request, &response.response)?;
        Ok(response)
    }

    /// Signs, throttles and sends one request without classifying the
    /// response, so callers can inspect failures themselves.
    #[instrument(
        name = "exchange_request",
        skip(self, params, headers, body),
        fields(exchange = %self.id())
    )]
    pub async fn fetch_raw(
        &self,
        name: &str,
        params: Params,
        headers: HeaderMap,
        body: Option<String>,
    ) -> Result<ApiResponse> {
        let (endpoint, request) = self.sign(name, params, headers, body)?;
        let response = self.dispatch(&endpoint, &request).await?;
        debug!(status = response.status, "Received response");
        let data = response.body.clone();
        Ok(ApiResponse {
            endpoint,
            request,
            response,
            data,
        })
    }

    /// Resolves `name` and builds the signed request through the hooks.
    pub fn sign(
        &self,
        name: &str,
        params: Params,
        headers: HeaderMap,
        body: Option<String>,
    ) -> Result<(Arc<EndpointDescriptor>, RequestEnvelope)> {
        let endpoint = Arc::clone(self.registry().require(name)?);
        let headers = merge_headers(&self.config().headers, headers);
        let request = self.hooks().sign(SignRequest {
            endpoint: &endpoint,
            params,
            headers,
            body,
            urls: self.urls(),
            credentials: &self.config().credentials,
        })?;
        Ok((endpoint, request))
    }

    /// Waits for the throttler at the endpoint's cost, then sends `request`.
    pub async fn dispatch(
        &self,
        endpoint: &EndpointDescriptor,
        request: &RequestEnvelope,
    ) -> Result<ResponseEnvelope> {
        self.http_client().dispatch(request, endpoint.cost).await
    }

    /// Runs the exchange's error hook, then the status table.
    pub fn classify(&self, request: &RequestEnvelope, response: &ResponseEnvelope) -> Result<()> {
        let ctx = ResponseContext {
            exchange_id: self.id(),
            method: request.method,
            url: &request.url,
            request_headers: &request.headers,
            request_body: request.body.as_deref(),
            response,
        };
        classifier::classify(self.hooks(), &ctx)
    }
}
