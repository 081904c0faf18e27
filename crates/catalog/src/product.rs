use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, ProductId};

const MAX_NAME_LEN: usize = 100;

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in smallest currency unit.
    pub price: u64,
    pub image: String,
    pub company: String,
    pub category: String,
}

impl Product {
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Display projection attached to reviews: just enough to render a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: u64,
}

/// Catalog seed record (used to load products into a catalog backend).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub id: Option<ProductId>,
    pub name: String,
    pub price: u64,
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub category: String,
}

fn default_image() -> String {
    "/uploads/example.jpeg".to_string()
}

impl NewProduct {
    /// Validate and assign an identifier (keeping a caller-provided one).
    pub fn into_product(self) -> DomainResult<Product> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("product name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "product name must be at most {MAX_NAME_LEN} characters"
            )));
        }

        Ok(Product {
            id: self.id.unwrap_or_default(),
            name: name.to_string(),
            price: self.price,
            image: self.image,
            company: self.company,
            category: self.category,
        })
    }
}
