//! CORS for the merchant panel.
//!
//! The panel is served from a different origin than the bridge and calls
//! `POST /shopify/products` with a JSON body, which triggers a preflight.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::BridgeConfig;

/// CORS layer allowing the panel's origin.
///
/// Falls back to denying cross-origin requests when the panel URL has no
/// usable origin.
pub fn cors_layer(config: &BridgeConfig) -> CorsLayer {
    let origin = config
        .frontend_origin()
        .and_then(|o| HeaderValue::from_str(&o).ok());

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match origin {
        Some(origin) => layer.allow_origin(AllowOrigin::exact(origin)),
        None => {
            tracing::warn!(
                frontend_url = %config.frontend_url,
                "FRONTEND_URL has no origin, cross-origin requests will be refused"
            );
            layer
        }
    }
}
