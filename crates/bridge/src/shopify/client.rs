//! Shopify OAuth and Admin REST API client.
//!
//! The client is stateless with respect to shops: every call takes the shop
//! domain and, for Admin API calls, the shop's access token.

use std::sync::Arc;

use panel_bridge_core::{AccessToken, ProductDraft, ShopDomain};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::instrument;

use crate::config::ShopifyAppConfig;

use super::{
    ShopifyError,
    types::{
        AccessTokenRequest, AccessTokenResponse, ImageCreateRequest, ProductCreateRequest,
        ProductCreateResponse,
    },
};

/// Scopes requested during app installation.
pub const ADMIN_SCOPES: &[&str] = &["write_products", "read_products"];

/// Header carrying the Admin API access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Result of a successful code exchange.
#[derive(Debug, Clone)]
pub struct OAuthGrant {
    /// Token for subsequent Admin API calls.
    pub access_token: AccessToken,
    /// Scopes Shopify actually granted, comma-separated.
    pub scope: Option<String>,
}

/// Shopify OAuth and Admin REST API client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ShopifyClient {
    inner: Arc<ShopifyClientInner>,
}

struct ShopifyClientInner {
    client: reqwest::Client,
    api_version: String,
    client_id: String,
    client_secret: SecretString,
    /// Replaces `https://<shop>` for server-side calls when set.
    upstream_url: Option<String>,
}

impl ShopifyClient {
    /// Create a new client.
    ///
    /// Every request made by the client is bounded by `config.timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ShopifyAppConfig) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("panel-bridge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ShopifyClientInner {
                client,
                api_version: config.api_version.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                upstream_url: config
                    .upstream_url
                    .as_deref()
                    .map(|u| u.trim_end_matches('/').to_string()),
            }),
        })
    }

    /// Get the client secret (for HMAC verification).
    #[must_use]
    pub fn client_secret(&self) -> &str {
        self.inner.client_secret.expose_secret()
    }

    /// Origin for server-side calls to `shop`.
    fn origin(&self, shop: &ShopDomain) -> String {
        self.inner
            .upstream_url
            .clone()
            .unwrap_or_else(|| shop.origin())
    }

    fn admin_url(&self, shop: &ShopDomain, path: &str) -> String {
        format!(
            "{}/admin/api/{}/{path}",
            self.origin(shop),
            self.inner.api_version
        )
    }

    // =========================================================================
    // OAuth Flow
    // =========================================================================

    /// Generate the OAuth authorization URL.
    ///
    /// Always points at the shop itself since the merchant's browser follows
    /// it. The URL is a pure function of its inputs and the configuration.
    #[must_use]
    pub fn authorization_url(&self, shop: &ShopDomain, redirect_uri: &str) -> String {
        format!(
            "{}/admin/oauth/authorize?client_id={}&scope={}&redirect_uri={}",
            shop.origin(),
            self.inner.client_id,
            ADMIN_SCOPES.join(","),
            redirect_uri
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::OAuth` if Shopify rejects the code or answers
    /// without a token, `ShopifyError::Timeout` if it does not answer in
    /// time, and `ShopifyError::Http` if the request fails.
    #[instrument(skip(self, code), fields(shop = %shop))]
    pub async fn exchange_code(
        &self,
        shop: &ShopDomain,
        code: &str,
    ) -> Result<OAuthGrant, ShopifyError> {
        let url = format!("{}/admin/oauth/access_token", self.origin(shop));

        let payload = AccessTokenRequest {
            client_id: &self.inner.client_id,
            client_secret: self.inner.client_secret.expose_secret(),
            code,
        };

        let response = self.inner.client.post(&url).json(&payload).send().await?;
        let status = response.status();
        let text = response.text().await?;

        // Error bodies are not always JSON; fall back to an empty response.
        let body: AccessTokenResponse = serde_json::from_str(&text).unwrap_or_default();

        if let Some(message) = body.error_message() {
            return Err(ShopifyError::OAuth(message));
        }

        if !status.is_success() {
            return Err(ShopifyError::OAuth(format!(
                "token exchange failed with status {}",
                status.as_u16()
            )));
        }

        let access_token = body
            .access_token
            .and_then(AccessToken::new)
            .ok_or_else(|| {
                ShopifyError::OAuth("token response did not include an access token".to_string())
            })?;

        Ok(OAuthGrant {
            access_token,
            scope: body.scope,
        })
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Create a product in draft status.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::ProductRejected` with Shopify's error payload
    /// on a non-success status, `ShopifyError::Parse` on an unreadable
    /// success body, and `ShopifyError::Timeout`/`Http` on transport failure.
    #[instrument(skip(self, token, draft), fields(shop = %shop, title = %draft.title))]
    pub async fn create_product(
        &self,
        shop: &ShopDomain,
        token: &AccessToken,
        draft: &ProductDraft,
    ) -> Result<ProductCreateResponse, ShopifyError> {
        let url = self.admin_url(shop, "products.json");
        let payload = ProductCreateRequest::from_draft(draft);

        let (status, text) = self.post_admin(&url, token, &payload).await?;

        if !status.is_success() {
            return Err(ShopifyError::ProductRejected {
                status: status.as_u16(),
                errors: upstream_errors(&text),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Attach one base64 image to an existing product.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::ImageRejected` on a non-success status and
    /// `ShopifyError::Timeout`/`Http` on transport failure.
    #[instrument(skip(self, token, image), fields(shop = %shop))]
    pub async fn attach_image(
        &self,
        shop: &ShopDomain,
        token: &AccessToken,
        product_id: u64,
        image: &str,
        position: usize,
    ) -> Result<(), ShopifyError> {
        let url = self.admin_url(shop, &format!("products/{product_id}/images.json"));
        let payload = ImageCreateRequest::new(image, position);

        let (status, text) = self.post_admin(&url, token, &payload).await?;

        if !status.is_success() {
            return Err(ShopifyError::ImageRejected {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(())
    }

    /// POST a JSON body to the Admin API and return status plus raw body.
    async fn post_admin<B: Serialize + Sync>(
        &self,
        url: &str,
        token: &AccessToken,
        body: &B,
    ) -> Result<(StatusCode, String), ShopifyError> {
        let response = self
            .inner
            .client
            .post(url)
            .header(ACCESS_TOKEN_HEADER, token.expose())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

/// Extract Shopify's error payload from a failed response body.
///
/// Prefers the `errors` member, then the whole JSON body, then the raw text.
fn upstream_errors(text: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => value.get("errors").cloned().unwrap_or(value),
        Err(_) => serde_json::Value::String(text.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    fn client(upstream_url: Option<&str>) -> ShopifyClient {
        ShopifyClient::new(&ShopifyAppConfig {
            api_version: "2024-10".to_string(),
            client_id: "abc123".to_string(),
            client_secret: SecretString::from("shhh"),
            upstream_url: upstream_url.map(str::to_string),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn shop() -> ShopDomain {
        ShopDomain::parse("demo.myshopify.com").unwrap()
    }

    #[test]
    fn test_authorization_url() {
        let url = client(None).authorization_url(&shop(), "https://bridge.test/shopify/callback");
        assert_eq!(
            url,
            "https://demo.myshopify.com/admin/oauth/authorize?client_id=abc123&scope=write_products,read_products&redirect_uri=https://bridge.test/shopify/callback"
        );
    }

    #[test]
    fn test_authorization_url_ignores_upstream_override() {
        let url = client(Some("http://127.0.0.1:9"))
            .authorization_url(&shop(), "https://bridge.test/shopify/callback");
        assert!(url.starts_with("https://demo.myshopify.com/admin/oauth/authorize?"));
    }

    #[test]
    fn test_admin_url_uses_shop_origin() {
        assert_eq!(
            client(None).admin_url(&shop(), "products.json"),
            "https://demo.myshopify.com/admin/api/2024-10/products.json"
        );
    }

    #[test]
    fn test_admin_url_uses_upstream_override() {
        assert_eq!(
            client(Some("http://127.0.0.1:9/")).admin_url(&shop(), "products/7/images.json"),
            "http://127.0.0.1:9/admin/api/2024-10/products/7/images.json"
        );
    }

    #[test]
    fn test_upstream_errors_prefers_errors_member() {
        assert_eq!(
            upstream_errors(r#"{"errors":{"title":["can't be blank"]}}"#),
            json!({"title": ["can't be blank"]})
        );
        assert_eq!(upstream_errors(r#"{"message":"nope"}"#), json!({"message": "nope"}));
        assert_eq!(upstream_errors("Bad Gateway"), json!("Bad Gateway"));
    }
}
