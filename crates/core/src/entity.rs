//! Entity traits: identity and ownership.

use crate::id::UserId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity that belongs to exactly one user.
///
/// Ownership is fixed at creation time. Authorization checks take the owner
/// from here so the same gate works for orders, reviews, and anything else
/// that records its author.
pub trait Owned: Entity {
    fn owner(&self) -> UserId;
}
