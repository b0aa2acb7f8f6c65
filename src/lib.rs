//! # CCXT Dispatch
//!
//! Shared REST dispatch layer for multi-exchange trading clients.
//!
//! An exchange client supplies its endpoint map, base URLs and signing
//! through [`ExchangeHooks`](ccxt_base::hooks::ExchangeHooks); this crate
//! provides the registry, throttling, dispatch, error classification and
//! market caching around it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ccxt_dispatch::prelude::*;
//!
//! struct Public;
//! impl ExchangeHooks for Public {}
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     init_logging(&LogConfig::development());
//!     let exchange = BaseExchange::new(ExchangeConfig::builder().id("public").build(), Public)?;
//!     println!("{} endpoints", exchange.registry().len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// Re-export core types and traits
pub use ccxt_base::{
    base_exchange, classifier, config, credentials, error, hooks, http_client, logging, registry,
    signer, throttler, types,
};
pub use ccxt_base::{Error, ErrorKind, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use ccxt_base::prelude::*;
}
