//! Admin REST API request and response bodies.

use panel_bridge_core::{Price, ProductDraft, attachment_payload};
use serde::{Deserialize, Serialize};

/// Body of `POST /admin/oauth/access_token`.
#[derive(Debug, Serialize)]
pub struct AccessTokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub code: &'a str,
}

/// Response of the token endpoint.
///
/// Shopify answers with `access_token` on success and with
/// `error`/`error_description` (or `errors`) on failure, so every field is
/// optional and checked by the client.
#[derive(Debug, Default, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub errors: Option<serde_json::Value>,
}

impl AccessTokenResponse {
    /// Best available human-readable error from the response, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match (&self.error, &self.error_description, &self.errors) {
            (Some(error), Some(description), _) => Some(format!("{error}: {description}")),
            (Some(error), None, _) => Some(error.clone()),
            (None, Some(description), _) => Some(description.clone()),
            (None, None, Some(serde_json::Value::String(s))) => Some(s.clone()),
            (None, None, Some(other)) => Some(other.to_string()),
            (None, None, None) => None,
        }
    }
}

/// Status of every product created through the bridge.
pub const DRAFT_STATUS: &str = "draft";

/// Wrapper for `POST /admin/api/<version>/products.json`.
#[derive(Debug, Serialize)]
pub struct ProductCreateRequest<'a> {
    pub product: NewProduct<'a>,
}

/// Product fields sent on creation.
#[derive(Debug, Serialize)]
pub struct NewProduct<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<&'a str>,
    pub status: &'static str,
    pub variants: Vec<NewVariant>,
}

/// Default variant carrying price and stock.
#[derive(Debug, Serialize)]
pub struct NewVariant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_management: Option<&'static str>,
}

impl<'a> ProductCreateRequest<'a> {
    /// Build the creation payload from a draft.
    ///
    /// Status is always `draft`; images are attached
    /// separately after creation.
    #[must_use]
    pub fn from_draft(draft: &'a ProductDraft) -> Self {
        let variant = NewVariant {
            price: draft.price,
            inventory_quantity: draft.inventory_quantity,
            // Shopify ignores inventory_quantity unless it tracks the variant.
            inventory_management: draft.inventory_quantity.map(|_| "shopify"),
        };

        Self {
            product: NewProduct {
                title: &draft.title,
                body_html: draft.body_html.as_deref(),
                tags: draft.tags.as_ref().map(panel_bridge_core::Tags::as_str),
                status: DRAFT_STATUS,
                variants: vec![variant],
            },
        }
    }
}

/// Response of the product creation endpoint.
///
/// The product is kept as raw JSON so the panel receives Shopify's
/// representation untouched.
#[derive(Debug, Deserialize)]
pub struct ProductCreateResponse {
    pub product: serde_json::Value,
}

impl ProductCreateResponse {
    /// Numeric ID of the created product.
    #[must_use]
    pub fn product_id(&self) -> Option<u64> {
        self.product.get("id").and_then(serde_json::Value::as_u64)
    }
}

/// Wrapper for `POST /admin/api/<version>/products/{id}/images.json`.
#[derive(Debug, Serialize)]
pub struct ImageCreateRequest<'a> {
    pub image: NewImage<'a>,
}

/// Image fields sent on attachment.
#[derive(Debug, Serialize)]
pub struct NewImage<'a> {
    /// Base64 image bytes.
    pub attachment: &'a str,
    /// 1-based position in the product gallery.
    pub position: usize,
}

impl<'a> ImageCreateRequest<'a> {
    /// Build an attachment payload, stripping any data URL prefix.
    #[must_use]
    pub fn new(image: &'a str, position: usize) -> Self {
        Self {
            image: NewImage {
                attachment: attachment_payload(image),
                position,
            },
        }
    }
}
