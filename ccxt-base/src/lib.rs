//! Shared REST dispatch layer for exchange clients
//!
//! Every exchange client is built from the same parts:
//!
//! - [`registry`]: compiles a declarative API map into named endpoints
//! - [`throttler`]: token-bucket gate with a FIFO queue
//! - [`signer`] and [`hooks`]: the per-exchange signing and error seams
//! - [`http_client`]: one pooled HTTP client per instance
//! - [`classifier`]: maps HTTP statuses and bodies to typed errors
//! - [`base_exchange`]: ties the above together and caches markets
//!
//! # Example
//!
//! ```rust,no_run
//! use ccxt_base::prelude::*;
//! use serde_json::{Value, json};
//! use std::collections::HashMap;
//!
//! struct Example;
//!
//! #[async_trait::async_trait]
//! impl ExchangeHooks for Example {
//!     fn api_definition(&self) -> Value {
//!         json!({"public": {"get": {"time": 1, "depth": 5}}})
//!     }
//!
//!     fn urls(&self) -> HashMap<String, String> {
//!         HashMap::from([("public".into(), "https://api.example.com".into())])
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let config = ExchangeConfig::builder().id("example").build();
//! let exchange = BaseExchange::new(config, Example)?;
//! let response = exchange.request("publicGetTime", Params::new()).await?;
//! println!("{}", response.data);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// =============================================================================
// Global Clippy Lint Suppressions
// =============================================================================
// - module_name_repetitions: Common pattern in Rust libraries (e.g., HttpConfig in http_client)
// - missing_errors_doc: Too verbose to document every Result-returning function
// - missing_panics_doc: Too verbose to document every potential panic
// - must_use_candidate: Not all return values need #[must_use]
// - doc_markdown: Technical terms in docs don't need backticks
// - cast_possible_truncation / cast_precision_loss: token arithmetic mixes f64 and integer millis
// - return_self_not_must_use: Builder pattern methods return Self without must_use
// =============================================================================
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::return_self_not_must_use)]

// Re-exports of external dependencies
pub use rust_decimal;
pub use serde;
pub use serde_json;

// Core modules
pub mod base_exchange;
pub mod classifier;
pub mod config;
pub mod credentials;
pub mod error;
pub mod hooks;
pub mod http_client;
pub mod logging;
pub mod registry;
pub mod signer;
pub mod throttler;
pub mod types;

// Re-exports of core types for convenience
pub use base_exchange::{
    ApiResponse, BaseExchange, ExchangeConfig, ExchangeConfigBuilder, MarketCache, MarketSnapshot,
};
pub use classifier::{ErrorCodeMap, ResponseContext};
pub use credentials::{Credentials, SecretString};
pub use error::{
    ContextExt, Error, ErrorKind, ExchangeErrorDetails, NetworkError, ParseError, Result,
};
pub use hooks::ExchangeHooks;
pub use registry::{EndpointDescriptor, EndpointRegistry, HttpMethod, Params};
pub use signer::{RequestEnvelope, SignRequest};
pub use throttler::{Throttler, ThrottlerConfig};
pub use types::{Currency, Market, MarketPrecision, MarketType, PrecisionMode};

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```rust
/// use ccxt_base::prelude::*;
/// ```
pub mod prelude {
    pub use crate::base_exchange::{
        ApiResponse, BaseExchange, ExchangeConfig, ExchangeConfigBuilder, MarketSnapshot,
    };
    pub use crate::classifier::{ErrorCodeMap, ResponseContext};
    pub use crate::config::ProxyConfig;
    pub use crate::credentials::{Credentials, SecretString};
    pub use crate::error::{ContextExt, Error, ErrorKind, Result};
    pub use crate::hooks::ExchangeHooks;
    pub use crate::http_client::{HttpClient, HttpConfig, ResponseEnvelope};
    pub use crate::logging::{LogConfig, LogFormat, LogLevel, init_logging, try_init_logging};
    pub use crate::registry::{EndpointDescriptor, EndpointRegistry, HttpMethod, Params};
    pub use crate::signer::{RequestEnvelope, SignRequest, default_sign};
    pub use crate::throttler::{Throttler, ThrottlerConfig};
    pub use crate::types::{
        Currency, Market, MarketPrecision, MarketType, PrecisionMode, Symbol,
    };
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "ccxt-base");
    }
}
