//! Business logic services.
//!
//! Services compose Shopify client calls into the operations the routes
//! expose.

pub mod publish;

pub use publish::{Publication, publish_product};
