//! Shopify app installation (OAuth) routes.
//!
//! The merchant panel sends the browser to `/shopify/auth?shop=...`; Shopify
//! calls back on `/shopify/callback`, and the browser ends up on the panel
//! with the access token in the URL fragment. Nothing is stored here.

use std::collections::BTreeMap;

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use panel_bridge_core::{AccessToken, ShopDomain};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, set_sentry_shop};
use crate::shopify::{ShopifyError, signature};
use crate::state::AppState;

/// Build the Shopify OAuth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shopify/auth", get(auth))
        .route("/shopify/callback", get(callback))
}

// =============================================================================
// Query Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AuthQueryParams {
    pub shop: Option<String>,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// GET /shopify/auth - Start OAuth flow.
#[instrument(skip(state))]
async fn auth(
    State(state): State<AppState>,
    Query(params): Query<AuthQueryParams>,
) -> Result<Response, AppError> {
    let shop = parse_shop(params.shop.as_deref())?;
    set_sentry_shop(&shop);

    let auth_url = state
        .shopify()
        .authorization_url(&shop, &state.config().callback_url());

    tracing::info!(shop = %shop, "Redirecting to Shopify OAuth");
    found(&auth_url)
}

/// GET /shopify/callback - Handle OAuth callback.
///
/// All query parameters are kept because every one of them is covered by
/// the HMAC signature.
#[instrument(skip(state, params), fields(shop = params.get("shop").map(String::as_str)))]
async fn callback(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Response, AppError> {
    // Merchant declined or Shopify reported a problem
    if let Some(error) = params.get("error") {
        let message = params
            .get("error_description")
            .map_or_else(|| error.clone(), |d| format!("{error}: {d}"));
        return Err(ShopifyError::OAuth(message).into());
    }

    let shop = parse_shop(params.get("shop").map(String::as_str))?;
    set_sentry_shop(&shop);

    if params.get("hmac").is_none_or(String::is_empty) {
        return Err(AppError::BadRequest("Missing hmac parameter".to_string()));
    }
    let code = params
        .get("code")
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing code parameter".to_string()))?;

    if !signature::verify_callback(&params, state.shopify().client_secret()) {
        tracing::error!(shop = %shop, "Invalid HMAC signature in OAuth callback");
        return Err(AppError::Unauthorized(
            "Invalid callback signature".to_string(),
        ));
    }

    let grant = state.shopify().exchange_code(&shop, code).await?;

    tracing::info!(
        shop = %shop,
        scope = grant.scope.as_deref().unwrap_or_default(),
        "Connected Shopify store"
    );

    found(&connected_redirect(
        &state.config().frontend_url,
        &shop,
        &grant.access_token,
    ))
}

// =============================================================================
// Helpers
// =============================================================================

/// Validate a `shop` query parameter.
fn parse_shop(raw: Option<&str>) -> Result<ShopDomain, AppError> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing shop parameter".to_string()))?;
    ShopDomain::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Panel URL announcing a successful connection.
///
/// The token goes in the fragment so it never reaches the panel's server
/// logs; it is appended exactly as Shopify issued it.
fn connected_redirect(frontend_url: &str, shop: &ShopDomain, token: &AccessToken) -> String {
    let base = frontend_url.split('#').next().unwrap_or(frontend_url);
    format!(
        "{base}#platform-connections?connected=shopify&shop={shop}&token={}",
        token.expose()
    )
}

/// 302 Found to `location`.
fn found(location: &str) -> Result<Response, AppError> {
    let location = HeaderValue::from_str(location)
        .map_err(|e| AppError::Internal(format!("invalid redirect location: {e}")))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
