//! Shopify OAuth and Admin REST API client.
//!
//! # Security
//!
//! Access tokens pass through this module on every call but are never stored
//! or logged. The client secret is only used for the token exchange and for
//! verifying callback signatures.
//!
//! # Architecture
//!
//! - Plain JSON over HTTPS via `reqwest` (REST Admin API, not GraphQL)
//! - One shared connection pool, bounded timeout on every request
//! - No retries or rate-limit handling
//!
//! # Example
//!
//! ```rust,ignore
//! use panel_bridge::shopify::ShopifyClient;
//!
//! let client = ShopifyClient::new(&config.shopify)?;
//!
//! let url = client.authorization_url(&shop, &config.callback_url());
//! let grant = client.exchange_code(&shop, "code-from-callback").await?;
//! let created = client.create_product(&shop, &grant.access_token, &draft).await?;
//! ```

mod client;
pub mod signature;
pub mod types;

pub use client::{ADMIN_SCOPES, OAuthGrant, ShopifyClient};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to Shopify.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// Shopify did not answer within the configured timeout.
    #[error("Shopify did not respond in time")]
    Timeout,

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The OAuth token exchange was rejected or returned no token.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Product creation was rejected; `errors` is Shopify's payload verbatim.
    #[error("Product rejected with status {status}")]
    ProductRejected {
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream error payload.
        errors: serde_json::Value,
    },

    /// Product creation succeeded but the response carried no product ID.
    #[error("Product response is missing an id")]
    MissingProductId,

    /// An image attachment was rejected.
    #[error("Image rejected with status {status}: {body}")]
    ImageRejected {
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream response body.
        body: String,
    },
}

impl From<reqwest::Error> for ShopifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}
