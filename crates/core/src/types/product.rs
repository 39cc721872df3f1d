//! Product listings submitted by the merchant panel.

use serde::{Deserialize, Deserializer, Serialize};

use super::Price;

/// A product listing as submitted by the panel.
///
/// Constructed entirely from caller input and never persisted. The panel has
/// historically sent both `snake_case` and `camelCase` keys, so the multi-word
/// fields accept either spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    /// Product title.
    pub title: String,
    /// Rich HTML description.
    #[serde(default, alias = "bodyHtml")]
    pub body_html: Option<String>,
    /// Price of the default variant.
    #[serde(default)]
    pub price: Option<Price>,
    /// Starting stock of the default variant.
    #[serde(default, alias = "inventoryQuantity")]
    pub inventory_quantity: Option<i64>,
    /// Comma-separated tags.
    #[serde(default)]
    pub tags: Option<Tags>,
    /// Base64-encoded images, attached in this order.
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductDraft {
    /// Returns `true` if the draft carries at least one image.
    #[must_use]
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}

/// Product tags, normalized to Shopify's comma-separated form.
///
/// Accepts either `"summer, sale"` or `["summer", "sale"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags(String);

impl Tags {
    /// Returns the comma-separated tag list.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawTags {
            Joined(String),
            List(Vec<String>),
        }

        let joined = match RawTags::deserialize(deserializer)? {
            RawTags::Joined(s) => s,
            RawTags::List(list) => list
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        };
        Ok(Self(joined))
    }
}

/// Strip a `data:<mime>;base64,` prefix from an image payload.
///
/// Browsers' `FileReader.readAsDataURL` produces data URLs, while Shopify's
/// `attachment` field expects bare base64. Bare payloads pass through.
#[must_use]
pub fn attachment_payload(image: &str) -> &str {
    image
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map_or(image, |(_, payload)| payload)
}
