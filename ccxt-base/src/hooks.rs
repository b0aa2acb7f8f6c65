//! The seam between the shared dispatch layer and one exchange.
//!
//! An exchange client is a [`BaseExchange`] plus an implementation of
//! [`ExchangeHooks`]. Every method has a default, so a public-data-only
//! exchange only supplies its endpoint map, base URLs and `fetch_markets`.
//!
//! ```rust
//! use async_trait::async_trait;
//! use ccxt_base::base_exchange::BaseExchange;
//! use ccxt_base::error::Result;
//! use ccxt_base::hooks::ExchangeHooks;
//! use ccxt_base::types::Market;
//! use serde_json::{Value, json};
//! use std::collections::HashMap;
//!
//! struct Example;
//!
//! #[async_trait]
//! impl ExchangeHooks for Example {
//!     fn api_definition(&self) -> Value {
//!         json!({"public": {"get": ["markets", "ticker/{id}"]}})
//!     }
//!
//!     fn urls(&self) -> HashMap<String, String> {
//!         HashMap::from([("public".into(), "https://api.example.com".into())])
//!     }
//!
//!     async fn fetch_markets(&self, exchange: &BaseExchange) -> Result<Vec<Market>> {
//!         let response = exchange.request("publicGetMarkets", Default::default()).await?;
//!         Ok(serde_json::from_value(response.data)?)
//!     }
//! }
//! ```

use crate::base_exchange::BaseExchange;
use crate::classifier::ResponseContext;
use crate::error::{Error, Result};
use crate::signer::{RequestEnvelope, SignRequest, default_sign};
use crate::types::{Currency, Market, PrecisionMode};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Exchange-specific behavior plugged into a [`BaseExchange`].
#[async_trait]
pub trait ExchangeHooks: Send + Sync + 'static {
    /// Declarative endpoint map compiled into the endpoint registry.
    fn api_definition(&self) -> Value {
        Value::Null
    }

    /// Base URL per API group. Config `url_overrides` take precedence.
    fn urls(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Builds the concrete request, adding authentication where needed.
    fn sign(&self, request: SignRequest<'_>) -> Result<RequestEnvelope> {
        default_sign(request)
    }

    /// Exchange-specific error detection; an `Err` ends classification.
    ///
    /// Runs before the status table, on every response including 2xx, so
    /// exchanges that report failures inside successful responses can
    /// surface them here.
    fn handle_errors(&self, _ctx: &ResponseContext<'_>) -> Result<()> {
        Ok(())
    }

    /// How market and currency precision values are expressed.
    fn precision_mode(&self) -> PrecisionMode {
        PrecisionMode::DecimalPlaces
    }

    /// Whether the market loader should call [`fetch_currencies`](Self::fetch_currencies).
    fn has_fetch_currencies(&self) -> bool {
        false
    }

    /// Lists every market of the exchange.
    async fn fetch_markets(&self, _exchange: &BaseExchange) -> Result<Vec<Market>> {
        Err(Error::not_supported("fetch_markets"))
    }

    /// Lists every currency of the exchange.
    async fn fetch_currencies(&self, _exchange: &BaseExchange) -> Result<Vec<Currency>> {
        Err(Error::not_supported("fetch_currencies"))
    }
}
