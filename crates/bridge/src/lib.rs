//! Panel Bridge library.
//!
//! Connects a merchant panel to Shopify stores: installs the app through
//! OAuth and publishes draft products with images through the Admin REST API.
//! The binary is a thin wrapper around [`app`]; integration tests serve the
//! same router.
//!
//! # Security
//!
//! - The client secret signs and verifies OAuth callbacks (HMAC-SHA256)
//! - Access tokens are handed to the panel and never stored server-side
//! - Shop domains are validated before they are put into any URL

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use state::AppState;

/// Build the application router with CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let config = state.config();

    Router::new()
        .merge(routes::routes(config.limits))
        .layer(middleware::cors_layer(config))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri().path(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
