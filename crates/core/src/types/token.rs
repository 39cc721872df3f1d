//! Shopify access token type.

use serde::{Deserialize, Serialize};

/// Shop-scoped Admin API bearer credential.
///
/// Obtained once through the OAuth code exchange and re-supplied by the panel
/// on every publish call. `Debug` never prints the value; use
/// [`AccessToken::expose`] at the exact point the raw token is needed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string.
    ///
    /// Returns `None` when the input is empty or whitespace-only.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Returns the raw token.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}
