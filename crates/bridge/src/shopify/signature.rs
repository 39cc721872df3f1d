//! HMAC verification for Shopify OAuth callbacks.
//!
//! Shopify signs the callback query string with the app's client secret. The
//! signed message is every query parameter except `hmac` (and the legacy
//! `signature`), sorted by key and joined as `key=value` pairs with `&`.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Parameters excluded from the signed message.
const UNSIGNED_PARAMS: &[&str] = &["hmac", "signature"];

/// Build the message Shopify signs from callback query parameters.
#[must_use]
pub fn signed_message(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(k, _)| !UNSIGNED_PARAMS.contains(&k.as_str()))
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Compute the hex-encoded HMAC-SHA256 of the callback parameters.
#[must_use]
pub fn sign(params: &BTreeMap<String, String>, client_secret: &str) -> String {
    // HMAC accepts keys of any length.
    let Ok(mut mac) = HmacSha256::new_from_slice(client_secret.as_bytes()) else {
        return String::new();
    };
    mac.update(signed_message(params).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify the `hmac` parameter of a Shopify OAuth callback.
///
/// Returns `false` if `hmac` is absent or not valid hex. The digest comparison
/// is constant-time.
#[must_use]
pub fn verify_callback(params: &BTreeMap<String, String>, client_secret: &str) -> bool {
    let Some(provided) = params.get("hmac") else {
        return false;
    };
    let Ok(provided) = hex::decode(provided) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(client_secret.as_bytes()) else {
        return false;
    };
    mac.update(signed_message(params).as_bytes());
    mac.verify_slice(&provided).is_ok()
}
