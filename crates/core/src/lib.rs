//! `storefront-core` — shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, strongly-typed identifiers, and the entity/ownership traits
//! used by the order and review modules.

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::{Entity, Owned};
pub use error::{DomainError, DomainResult};
pub use id::{OrderId, ProductId, ReviewId, UserId};
pub use value_object::{Currency, ValueObject};
