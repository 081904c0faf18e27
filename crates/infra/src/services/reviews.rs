//! Review creation, reads, and owner-gated edits.

use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use storefront_auth::{authorize_owned, Principal};
use storefront_core::{ProductId, ReviewId};
use storefront_reviews::{Review, ReviewContent, ReviewWithProduct};

use crate::catalog::ProductCatalog;
use crate::store::{ReviewFilter, ReviewStore};

use super::{ServiceError, ServiceResult};

/// Raw rating/title/comment as submitted; validated into [`ReviewContent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReviewInput {
    pub rating: Option<u8>,
    pub title: Option<String>,
    pub comment: Option<String>,
}

impl ReviewInput {
    fn into_content(self) -> ServiceResult<ReviewContent> {
        Ok(ReviewContent::new(self.rating, self.title, self.comment)?)
    }
}

#[derive(Debug, Clone)]
pub struct ReviewService<C, S> {
    catalog: C,
    store: S,
}

impl<C, S> ReviewService<C, S>
where
    C: ProductCatalog,
    S: ReviewStore,
{
    pub fn new(catalog: C, store: S) -> Self {
        Self { catalog, store }
    }

    /// One review per `(product, user)`.
    ///
    /// An existing review is reported as a validation failure; a concurrent
    /// create that slips past that read is rejected by the store as a conflict.
    #[instrument(skip(self, input), fields(user_id = %principal.user_id), err)]
    pub async fn create_review(
        &self,
        product: ProductId,
        input: ReviewInput,
        principal: &Principal,
    ) -> ServiceResult<Review> {
        if self.catalog.find_product(product).await?.is_none() {
            return Err(ServiceError::NotFound(format!("no product with id: {product}")));
        }

        if self
            .store
            .find_by_product_and_user(product, principal.user_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Validation(
                "already submitted review for this product".to_string(),
            ));
        }

        let content = input.into_content()?;
        let review = Review::new(ReviewId::new(), product, principal.user_id, content, Utc::now());
        let review = self.store.insert(review).await?;

        tracing::info!(review_id = %review.id_typed(), product_id = %product, "review created");
        Ok(review)
    }

    /// Every review, each joined with its product's name and price.
    pub async fn list_all_reviews(&self) -> ServiceResult<Vec<ReviewWithProduct>> {
        let reviews = self.store.list(ReviewFilter::All).await?;

        let mut ids: Vec<ProductId> = reviews.iter().map(Review::product).collect();
        ids.sort();
        ids.dedup();
        let products = self.catalog.find_products(&ids).await?;

        Ok(reviews
            .into_iter()
            .map(|review| {
                let product = products.get(&review.product()).map(|p| p.summary());
                ReviewWithProduct { review, product }
            })
            .collect())
    }

    pub async fn list_reviews_for_product(&self, product: ProductId) -> ServiceResult<Vec<Review>> {
        Ok(self.store.list(ReviewFilter::Product(product)).await?)
    }

    pub async fn get_review(&self, id: ReviewId) -> ServiceResult<Review> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("no review with id: {id}")))
    }

    /// Replace rating, title and comment. Product and author never change.
    #[instrument(skip(self, input), fields(user_id = %principal.user_id), err)]
    pub async fn update_review(
        &self,
        id: ReviewId,
        input: ReviewInput,
        principal: &Principal,
    ) -> ServiceResult<Review> {
        let mut review = self.get_review(id).await?;
        authorize_owned(principal, &review)?;

        review.edit(input.into_content()?, Utc::now());
        Ok(self.store.save(review).await?)
    }

    /// Returns the id of the removed review.
    #[instrument(skip(self), fields(user_id = %principal.user_id), err)]
    pub async fn delete_review(&self, id: ReviewId, principal: &Principal) -> ServiceResult<ReviewId> {
        let review = self.get_review(id).await?;
        authorize_owned(principal, &review)?;

        if !self.store.delete(id).await? {
            return Err(ServiceError::NotFound(format!("no review with id: {id}")));
        }
        tracing::info!(review_id = %id, "review removed");
        Ok(id)
    }
}
