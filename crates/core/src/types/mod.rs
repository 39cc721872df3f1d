//! Core types for the panel bridge.
//!
//! This module provides type-safe wrappers for the domain concepts that cross
//! the bridge.

pub mod price;
pub mod product;
pub mod shop;
pub mod token;

pub use price::{Price, PriceError};
pub use product::{ProductDraft, Tags, attachment_payload};
pub use shop::{ShopDomain, ShopDomainError};
pub use token::AccessToken;
