//! Panel Bridge Core - Shared domain types.
//!
//! This crate provides the types exchanged between the merchant panel, the
//! bridge service and Shopify:
//! - [`ShopDomain`] - a validated `*.myshopify.com` host
//! - [`AccessToken`] - a shop-scoped bearer credential with a redacting `Debug`
//! - [`ProductDraft`] - a product listing as submitted by the panel
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O and no HTTP clients. The
//! bridge crate owns every network call.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
