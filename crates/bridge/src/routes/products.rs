//! Product publication route.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    routing::post,
};
use panel_bridge_core::{AccessToken, ProductDraft, ShopDomain};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::config::PublishLimits;
use crate::error::{AppError, set_sentry_shop};
use crate::services::publish_product;
use crate::state::AppState;

/// Build the product publication router.
///
/// The body limit is enforced while reading the request, so oversize
/// uploads fail before any Shopify call.
pub fn router(limits: PublishLimits) -> Router<AppState> {
    Router::new().route(
        "/shopify/products",
        post(create_product).layer(DefaultBodyLimit::max(limits.max_body_bytes)),
    )
}

/// Caller identity fields of a `POST /shopify/products` body.
///
/// Read from the raw JSON before the product fields are parsed, so a request
/// without a token is refused whatever else it carries.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PublishCredentials {
    pub shop: Option<String>,
    pub access_token: Option<AccessToken>,
}

impl PublishCredentials {
    /// Extract `shop` and `accessToken` (or `access_token`) from a body.
    ///
    /// Non-string values count as absent.
    #[must_use]
    pub fn from_body(body: &Value) -> Self {
        let field = |key: &str| body.get(key).and_then(Value::as_str);

        Self {
            shop: field("shop").map(str::to_string),
            access_token: field("accessToken")
                .or_else(|| field("access_token"))
                .and_then(AccessToken::new),
        }
    }
}

/// POST /shopify/products - Create a draft product and attach its images.
///
/// Checks run in order: shop (400), access token (403), product fields (400),
/// image count (413). Responds with Shopify's product on creation success even
/// if some images failed to attach.
#[instrument(skip(state, payload))]
async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = payload?;
    let credentials = PublishCredentials::from_body(&body);

    let shop = credentials
        .shop
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing shop".to_string()))?;
    let shop = ShopDomain::parse(shop).map_err(|e| AppError::BadRequest(e.to_string()))?;
    set_sentry_shop(&shop);

    let token = credentials
        .access_token
        .ok_or_else(|| AppError::Forbidden("Missing access token".to_string()))?;

    let draft = ProductDraft::deserialize(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid product: {e}")))?;

    let max_images = state.config().limits.max_images;
    if draft.images.len() > max_images {
        return Err(AppError::PayloadTooLarge(format!(
            "At most {max_images} images per product"
        )));
    }

    let publication = publish_product(state.shopify(), &shop, &token, &draft).await?;

    tracing::info!(
        shop = %shop,
        product_id = publication.product_id,
        images_attached = publication.images_attached,
        images_failed = publication.images_failed,
        "Published draft product"
    );

    Ok(Json(json!({
        "status": "success",
        "data": publication.product,
    })))
}
