//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::shopify::{ShopifyClient, ShopifyError};

/// Application state shared across all handlers.
///
/// Holds no per-shop data: access tokens travel with each request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BridgeConfig,
    shopify: ShopifyClient,
}

impl AppState {
    /// Build the state, creating the shared Shopify client.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Http` if the HTTP client cannot be built.
    pub fn new(config: BridgeConfig) -> Result<Self, ShopifyError> {
        let shopify = ShopifyClient::new(&config.shopify)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, shopify }),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Returns the Shopify client.
    #[must_use]
    pub fn shopify(&self) -> &ShopifyClient {
        &self.inner.shopify
    }
}
