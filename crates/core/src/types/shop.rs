//! Shopify shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop cannot be empty")]
    Empty,
    /// The input does not end with the Shopify storefront suffix.
    #[error("shop must be a {suffix} domain")]
    WrongSuffix {
        /// Required domain suffix.
        suffix: &'static str,
    },
    /// The store name (before the suffix) is empty or too long.
    #[error("shop name must be 1-{max} characters")]
    BadLength {
        /// Maximum allowed store name length.
        max: usize,
    },
    /// The store name contains a character outside `[a-z0-9-]`.
    #[error("shop name contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The store name starts with a hyphen.
    #[error("shop name cannot start with a hyphen")]
    LeadingHyphen,
}

/// A Shopify storefront host, e.g. `demo.myshopify.com`.
///
/// The value is interpolated into upstream URLs, so it is validated before
/// use: anything that is not a plain `<name>.myshopify.com` host (ports,
/// paths, userinfo, other domains) is rejected.
///
/// ## Constraints
///
/// - Case-insensitive, stored lower-cased with surrounding whitespace removed
/// - Must end with `.myshopify.com`
/// - Store name: 1-60 characters of `[a-z0-9-]`, not starting with `-`
///
/// ## Examples
///
/// ```
/// use panel_bridge_core::ShopDomain;
///
/// assert!(ShopDomain::parse("demo.myshopify.com").is_ok());
/// assert!(ShopDomain::parse("Demo-Store.MyShopify.com").is_ok());
///
/// assert!(ShopDomain::parse("").is_err());
/// assert!(ShopDomain::parse("evil.com").is_err());
/// assert!(ShopDomain::parse("evil.com/x?.myshopify.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Domain suffix every storefront host carries.
    pub const SUFFIX: &'static str = ".myshopify.com";

    /// Maximum length of the store name part.
    pub const MAX_NAME_LENGTH: usize = 60;

    /// Parse a `ShopDomain` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, is not a `.myshopify.com`
    /// host, or has a malformed store name.
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        let normalized = s.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        let name = normalized
            .strip_suffix(Self::SUFFIX)
            .ok_or(ShopDomainError::WrongSuffix {
                suffix: Self::SUFFIX,
            })?;

        if name.is_empty() || name.len() > Self::MAX_NAME_LENGTH {
            return Err(ShopDomainError::BadLength {
                max: Self::MAX_NAME_LENGTH,
            });
        }

        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(ShopDomainError::InvalidCharacter(c));
        }

        if name.starts_with('-') {
            return Err(ShopDomainError::LeadingHyphen);
        }

        Ok(Self(normalized))
    }

    /// Returns the shop domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the HTTPS origin of the shop, e.g. `https://demo.myshopify.com`.
    #[must_use]
    pub fn origin(&self) -> String {
        format!("https://{}", self.0)
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ShopDomain {
    type Err = ShopDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShopDomain {
    type Error = ShopDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShopDomain> for String {
    fn from(shop: ShopDomain) -> Self {
        shop.0
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_shops() {
        assert!(ShopDomain::parse("demo.myshopify.com").is_ok());
        assert!(ShopDomain::parse("demo-store-2.myshopify.com").is_ok());
        assert!(ShopDomain::parse("a.myshopify.com").is_ok());
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let shop = ShopDomain::parse("  Demo.MyShopify.COM ").unwrap();
        assert_eq!(shop.as_str(), "demo.myshopify.com");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ShopDomain::parse(""), Err(ShopDomainError::Empty));
        assert_eq!(ShopDomain::parse("   "), Err(ShopDomainError::Empty));
    }

    #[test]
    fn test_parse_wrong_suffix() {
        assert!(matches!(
            ShopDomain::parse("demo.example.com"),
            Err(ShopDomainError::WrongSuffix { .. })
        ));
        assert!(matches!(
            ShopDomain::parse("demo.myshopify.com:8080"),
            Err(ShopDomainError::WrongSuffix { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_url_injection() {
        assert_eq!(
            ShopDomain::parse("evil.com/x?.myshopify.com"),
            Err(ShopDomainError::InvalidCharacter('.'))
        );
        assert_eq!(
            ShopDomain::parse("user@demo.myshopify.com"),
            Err(ShopDomainError::InvalidCharacter('@'))
        );
    }

    #[test]
    fn test_parse_bad_length() {
        assert!(matches!(
            ShopDomain::parse(".myshopify.com"),
            Err(ShopDomainError::BadLength { .. })
        ));
        let long = format!("{}.myshopify.com", "a".repeat(61));
        assert!(matches!(
            ShopDomain::parse(&long),
            Err(ShopDomainError::BadLength { .. })
        ));
    }

    #[test]
    fn test_parse_leading_hyphen() {
        assert_eq!(
            ShopDomain::parse("-demo.myshopify.com"),
            Err(ShopDomainError::LeadingHyphen)
        );
    }

    #[test]
    fn test_origin() {
        let shop = ShopDomain::parse("demo.myshopify.com").unwrap();
        assert_eq!(shop.origin(), "https://demo.myshopify.com");
    }

    #[test]
    fn test_deserialize_validates() {
        let shop: ShopDomain = serde_json::from_str("\"demo.myshopify.com\"").unwrap();
        assert_eq!(shop.as_str(), "demo.myshopify.com");

        assert!(serde_json::from_str::<ShopDomain>("\"evil.com\"").is_err());
    }
}
