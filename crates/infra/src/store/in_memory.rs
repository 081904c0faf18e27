//! In-memory stores for tests/dev.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use storefront_core::{OrderId, ProductId, ReviewId, UserId};
use storefront_orders::{Order, OrderStatus};
use storefront_reviews::Review;

use super::{OrderFilter, OrderStore, ReviewFilter, ReviewStore, StoreError};

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    inner: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<Order, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let id = order.id_typed();
        if map.contains_key(&id) {
            return Err(StoreError::Conflict(format!("order {id} already exists")));
        }
        map.insert(id, order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut orders: Vec<Order> = map.values().filter(|o| filter.matches(o)).cloned().collect();
        orders.sort_by_key(|o| (o.created_at(), o.id_typed()));
        Ok(orders)
    }

    async fn save(&self, order: Order, expected: OrderStatus) -> Result<Order, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let id = order.id_typed();
        let Some(slot) = map.get_mut(&id) else {
            return Err(StoreError::Missing(format!("order {id}")));
        };
        if slot.status() != expected {
            return Err(StoreError::Conflict(format!(
                "order {id} is {}, expected {}",
                slot.status().as_str(),
                expected.as_str()
            )));
        }
        *slot = order.clone();
        Ok(order)
    }
}

#[derive(Debug, Default)]
struct ReviewTable {
    by_id: HashMap<ReviewId, Review>,
    by_author: HashMap<(ProductId, UserId), ReviewId>,
}

/// Reviews plus a unique index on `(product, user)`.
///
/// The index is checked and updated under the same write lock as the insert,
/// so concurrent creates for the same pair cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryReviewStore {
    inner: RwLock<ReviewTable>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn insert(&self, review: Review) -> Result<Review, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        let key = (review.product(), review.user());
        if table.by_author.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "user {} already reviewed product {}",
                key.1, key.0
            )));
        }
        let id = review.id_typed();
        if table.by_id.contains_key(&id) {
            return Err(StoreError::Conflict(format!("review {id} already exists")));
        }

        table.by_author.insert(key, id);
        table.by_id.insert(id, review.clone());
        Ok(review)
    }

    async fn get(&self, id: ReviewId) -> Result<Option<Review>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table.by_id.get(&id).cloned())
    }

    async fn find_by_product_and_user(
        &self,
        product: ProductId,
        user: UserId,
    ) -> Result<Option<Review>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table
            .by_author
            .get(&(product, user))
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn list(&self, filter: ReviewFilter) -> Result<Vec<Review>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        let mut reviews: Vec<Review> = table.by_id.values().filter(|r| filter.matches(r)).cloned().collect();
        reviews.sort_by_key(|r| (r.created_at(), r.id_typed()));
        Ok(reviews)
    }

    async fn save(&self, review: Review) -> Result<Review, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        let id = review.id_typed();
        let Some(slot) = table.by_id.get_mut(&id) else {
            return Err(StoreError::Missing(format!("review {id}")));
        };
        if slot.product() != review.product() || slot.user() != review.user() {
            return Err(StoreError::Conflict(format!(
                "review {id}: product and user cannot change"
            )));
        }
        *slot = review.clone();
        Ok(review)
    }

    async fn delete(&self, id: ReviewId) -> Result<bool, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        match table.by_id.remove(&id) {
            Some(review) => {
                table.by_author.remove(&(review.product(), review.user()));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use storefront_reviews::ReviewContent;

    fn review(product: ProductId, user: UserId) -> Review {
        let content = ReviewContent::new(Some(4), Some("good".into()), Some("nice".into())).unwrap();
        Review::new(ReviewId::new(), product, user, content, Utc::now())
    }

    #[tokio::test]
    async fn second_review_for_same_pair_conflicts() {
        let store = InMemoryReviewStore::new();
        let (product, user) = (ProductId::new(), UserId::new());

        store.insert(review(product, user)).await.unwrap();
        let err = store.insert(review(product, user)).await.unwrap_err();

        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.list(ReviewFilter::Product(product)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_frees_the_pair() {
        let store = InMemoryReviewStore::new();
        let (product, user) = (ProductId::new(), UserId::new());
        let first = store.insert(review(product, user)).await.unwrap();

        assert!(store.delete(first.id_typed()).await.unwrap());
        assert!(!store.delete(first.id_typed()).await.unwrap());
        assert!(store.find_by_product_and_user(product, user).await.unwrap().is_none());
        store.insert(review(product, user)).await.unwrap();
    }

    #[tokio::test]
    async fn list_filters_by_product() {
        let store = InMemoryReviewStore::new();
        let (p1, p2) = (ProductId::new(), ProductId::new());
        store.insert(review(p1, UserId::new())).await.unwrap();
        store.insert(review(p1, UserId::new())).await.unwrap();
        store.insert(review(p2, UserId::new())).await.unwrap();

        assert_eq!(store.list(ReviewFilter::All).await.unwrap().len(), 3);
        assert_eq!(store.list(ReviewFilter::Product(p1)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn save_requires_existing_review() {
        let store = InMemoryReviewStore::new();
        let err = store.save(review(ProductId::new(), UserId::new())).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing(_)));
    }

    #[tokio::test]
    async fn concurrent_inserts_for_same_pair_admit_one() {
        let store = std::sync::Arc::new(InMemoryReviewStore::new());
        let (product, user) = (ProductId::new(), UserId::new());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.insert(review(product, user)).await }));
        }

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
    }
}
