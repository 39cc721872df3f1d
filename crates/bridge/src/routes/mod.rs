//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                   - Liveness message
//! GET  /health             - Health check
//!
//! # Shopify app installation (OAuth)
//! GET  /shopify/auth       - Redirect to Shopify's authorization page
//! GET  /shopify/callback   - Exchange the code, redirect to the panel with the token
//!
//! # Publishing
//! POST /shopify/products   - Create a draft product, then attach its images
//! ```

use axum::{Router, routing::get};

use crate::config::PublishLimits;
use crate::state::AppState;

pub mod products;
pub mod shopify;

/// Build the complete router.
pub fn routes(limits: PublishLimits) -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .merge(shopify::router())
        .merge(products::router(limits))
}

/// Plain-text liveness message for the panel's connection check.
async fn index() -> &'static str {
    "Panel bridge is running"
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Shopify is not contacted.
async fn health() -> &'static str {
    "ok"
}
