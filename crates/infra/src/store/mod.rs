//! Order and review persistence.
//!
//! Stores are document-style: insert, fetch by id, list by filter, save.
//! The review store carries the `(product, user)` uniqueness constraint; the
//! services' duplicate pre-check is only a fast path for a friendlier error.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use storefront_core::{OrderId, ProductId, ReviewId, UserId};
use storefront_orders::{Order, OrderStatus};
use storefront_reviews::Review;

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryOrderStore, InMemoryReviewStore};
pub use postgres::{PostgresOrderStore, PostgresReviewStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint or a stale conditional write rejected the write.
    #[error("conflicting write: {0}")]
    Conflict(String),

    /// A save targeted a record that does not exist.
    #[error("record not found: {0}")]
    Missing(String),

    /// A stored record could not be mapped back into the domain.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Which orders to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFilter {
    All,
    Owner(UserId),
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            OrderFilter::All => true,
            OrderFilter::Owner(user) => order.user() == *user,
        }
    }
}

/// Which reviews to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewFilter {
    All,
    Product(ProductId),
}

impl ReviewFilter {
    pub fn matches(&self, review: &Review) -> bool {
        match self {
            ReviewFilter::All => true,
            ReviewFilter::Product(product) => review.product() == *product,
        }
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> Result<Order, StoreError>;
    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
    /// Oldest first.
    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError>;
    /// Writes only if the stored status is still `expected`; otherwise
    /// [`StoreError::Conflict`] and the stored order is left alone.
    async fn save(&self, order: Order, expected: OrderStatus) -> Result<Order, StoreError>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] if `(product, user)` already has a review.
    async fn insert(&self, review: Review) -> Result<Review, StoreError>;
    async fn get(&self, id: ReviewId) -> Result<Option<Review>, StoreError>;
    async fn find_by_product_and_user(
        &self,
        product: ProductId,
        user: UserId,
    ) -> Result<Option<Review>, StoreError>;
    /// Oldest first.
    async fn list(&self, filter: ReviewFilter) -> Result<Vec<Review>, StoreError>;
    async fn save(&self, review: Review) -> Result<Review, StoreError>;
    /// Returns `false` if nothing was removed.
    async fn delete(&self, id: ReviewId) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    async fn insert(&self, order: Order) -> Result<Order, StoreError> {
        (**self).insert(order).await
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        (**self).get(id).await
    }

    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError> {
        (**self).list(filter).await
    }

    async fn save(&self, order: Order, expected: OrderStatus) -> Result<Order, StoreError> {
        (**self).save(order, expected).await
    }
}

#[async_trait]
impl<S> ReviewStore for Arc<S>
where
    S: ReviewStore + ?Sized,
{
    async fn insert(&self, review: Review) -> Result<Review, StoreError> {
        (**self).insert(review).await
    }

    async fn get(&self, id: ReviewId) -> Result<Option<Review>, StoreError> {
        (**self).get(id).await
    }

    async fn find_by_product_and_user(
        &self,
        product: ProductId,
        user: UserId,
    ) -> Result<Option<Review>, StoreError> {
        (**self).find_by_product_and_user(product, user).await
    }

    async fn list(&self, filter: ReviewFilter) -> Result<Vec<Review>, StoreError> {
        (**self).list(filter).await
    }

    async fn save(&self, review: Review) -> Result<Review, StoreError> {
        (**self).save(review).await
    }

    async fn delete(&self, id: ReviewId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }
}
