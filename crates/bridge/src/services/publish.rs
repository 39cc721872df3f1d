//! Two-stage product publication.
//!
//! Stage 1 creates the product in draft status and is fatal on failure.
//! Stage 2 attaches the images one at a time, in the order given; a failed
//! image is logged and skipped so the product still exists with the images
//! that did succeed.

use panel_bridge_core::{AccessToken, ProductDraft, ShopDomain};
use tracing::instrument;

use crate::shopify::{ShopifyClient, ShopifyError};

/// Outcome of a publication whose Stage 1 succeeded.
#[derive(Debug)]
pub struct Publication {
    /// Shopify's representation of the created product.
    pub product: serde_json::Value,
    /// Shopify product ID.
    pub product_id: u64,
    /// Images Shopify accepted.
    pub images_attached: usize,
    /// Images that failed; logged only.
    pub images_failed: usize,
}

/// Create `draft` in `shop`, then attach its images best-effort.
///
/// Every image is attempted exactly once, sequentially, whatever happened to
/// the previous one.
///
/// # Errors
///
/// Returns the Stage 1 error if product creation fails (no image call is
/// made), or `ShopifyError::MissingProductId` if Shopify's response has no
/// product ID. Image failures never produce an error.
#[instrument(skip(client, token, draft), fields(shop = %shop, images = draft.images.len()))]
pub async fn publish_product(
    client: &ShopifyClient,
    shop: &ShopDomain,
    token: &AccessToken,
    draft: &ProductDraft,
) -> Result<Publication, ShopifyError> {
    let created = client.create_product(shop, token, draft).await?;
    let product_id = created.product_id().ok_or(ShopifyError::MissingProductId)?;

    tracing::info!(product_id, "Created draft product");

    let mut images_attached = 0;
    let mut images_failed = 0;

    for (index, image) in draft.images.iter().enumerate() {
        let position = index + 1;
        match client
            .attach_image(shop, token, product_id, image, position)
            .await
        {
            Ok(()) => images_attached += 1,
            Err(e) => {
                images_failed += 1;
                tracing::warn!(product_id, position, error = %e, "Failed to attach image, skipping");
            }
        }
    }

    if draft.has_images() {
        tracing::info!(
            product_id,
            images_attached,
            images_failed,
            "Finished attaching images"
        );
    }

    Ok(Publication {
        product: created.product,
        product_id,
        images_attached,
        images_failed,
    })
}
