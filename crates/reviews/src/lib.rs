//! Product reviews domain module.
//!
//! Content rules and the immutable-author/immutable-product shape of a review.
//! Uniqueness per `(product, user)` is enforced by the stores; ownership by
//! `storefront-auth`.

pub mod review;

pub use review::{Rating, Review, ReviewContent, ReviewParts, ReviewWithProduct};
