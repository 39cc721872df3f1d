//! Unified error handling for the bridge.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use panel_bridge_core::ShopDomain;
use serde_json::json;
use thiserror::Error;

use crate::shopify::ShopifyError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Missing or malformed input.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Callback signature did not verify.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// No access token for the requested action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request exceeds the configured size limits.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Shopify(ShopifyError::OAuth(_)) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Shopify(ShopifyError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            Self::Shopify(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal details are not exposed.
    fn public_message(&self) -> String {
        match self {
            Self::Shopify(ShopifyError::OAuth(message)) => {
                format!("Shopify authorization failed: {message}")
            }
            Self::Shopify(ShopifyError::ProductRejected { .. }) => {
                "Shopify rejected the product".to_string()
            }
            Self::Shopify(ShopifyError::Timeout) => "Shopify did not respond in time".to_string(),
            Self::Shopify(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Bridge request error"
            );
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let mut body = json!({
            "status": "error",
            "message": self.public_message(),
        });

        if let Self::Shopify(ShopifyError::ProductRejected { errors, .. }) = self {
            body["errors"] = errors;
        }

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(rejection.body_text())
        } else {
            Self::BadRequest(rejection.body_text())
        }
    }
}

/// Tag the current Sentry scope with the shop being served.
pub fn set_sentry_shop(shop: &ShopDomain) {
    sentry::configure_scope(|scope| {
        scope.set_tag("shop", shop.as_str());
    });
}
