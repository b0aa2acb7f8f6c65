//! HTTP dispatcher
//!
//! One pooled `reqwest` client per exchange instance, honoring proxy, timeout
//! and pool settings. A dispatch waits for the instance throttler, performs
//! exactly one request and returns a [`ResponseEnvelope`] for every HTTP
//! status. Classifying the status is left to [`crate::classifier`].
//!
//! ```rust,no_run
//! use ccxt_base::http_client::{HttpClient, HttpConfig};
//! use ccxt_base::registry::HttpMethod;
//! use ccxt_base::signer::RequestEnvelope;
//!
//! # async fn example() -> ccxt_base::error::Result<()> {
//! let client = HttpClient::new(HttpConfig::default())?;
//! let request = RequestEnvelope::new(HttpMethod::Get, "https://api.example.com/time");
//! let response = client.dispatch(&request, 1.0).await?;
//! println!("{} {}", response.status, response.raw_body);
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod headers;
mod request;
mod response;

pub use builder::HttpClient;
pub use config::HttpConfig;
pub use response::ResponseEnvelope;

pub(crate) use headers::merge_headers;
