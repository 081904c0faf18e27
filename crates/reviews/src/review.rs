use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::ProductSummary;
use storefront_core::{DomainError, DomainResult, Entity, Owned, ProductId, ReviewId, UserId, ValueObject};

const MAX_TITLE_LEN: usize = 100;

/// Star rating, 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> DomainResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::validation(format!(
                "rating must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl ValueObject for Rating {}

impl TryFrom<u8> for Rating {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// The owner-editable part of a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewContent {
    pub rating: Rating,
    pub title: String,
    pub comment: String,
}

impl ReviewContent {
    /// Validate raw input into review content.
    pub fn new(rating: Option<u8>, title: Option<String>, comment: Option<String>) -> DomainResult<Self> {
        let rating = rating.ok_or_else(|| DomainError::validation("please provide rating"))?;
        let rating = Rating::new(rating)?;

        let title = title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return Err(DomainError::validation("please provide review title"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::validation(format!(
                "review title must be at most {MAX_TITLE_LEN} characters"
            )));
        }

        let comment = comment.as_deref().map(str::trim).unwrap_or_default();
        if comment.is_empty() {
            return Err(DomainError::validation("please provide review text"));
        }

        Ok(Self {
            rating,
            title: title.to_string(),
            comment: comment.to_string(),
        })
    }
}

/// Persistence form of a [`Review`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewParts {
    pub id: ReviewId,
    pub product: ProductId,
    pub user: UserId,
    pub content: ReviewContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's review of a product.
///
/// `product` and `user` never change after creation; only the content does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    id: ReviewId,
    product: ProductId,
    user: UserId,
    content: ReviewContent,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        id: ReviewId,
        product: ProductId,
        user: UserId,
        content: ReviewContent,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            product,
            user,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn restore(parts: ReviewParts) -> Self {
        Self {
            id: parts.id,
            product: parts.product,
            user: parts.user,
            content: parts.content,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        }
    }

    pub fn id_typed(&self) -> ReviewId {
        self.id
    }

    pub fn product(&self) -> ProductId {
        self.product
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn content(&self) -> &ReviewContent {
        &self.content
    }

    pub fn rating(&self) -> Rating {
        self.content.rating
    }

    pub fn title(&self) -> &str {
        &self.content.title
    }

    pub fn comment(&self) -> &str {
        &self.content.comment
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace rating, title and comment.
    pub fn edit(&mut self, content: ReviewContent, now: DateTime<Utc>) {
        self.content = content;
        self.updated_at = now;
    }

    pub fn into_parts(self) -> ReviewParts {
        ReviewParts {
            id: self.id,
            product: self.product,
            user: self.user,
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for Review {
    type Id = ReviewId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Owned for Review {
    fn owner(&self) -> UserId {
        self.user
    }
}

/// A review joined with a display projection of its product.
///
/// `product` is `None` when the product no longer resolves in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewWithProduct {
    pub review: Review,
    pub product: Option<ProductSummary>,
}
