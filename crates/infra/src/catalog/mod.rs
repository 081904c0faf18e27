//! Read access to the product catalog.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use storefront_catalog::Product;
use storefront_core::ProductId;

use crate::store::StoreError;

pub mod postgres;

pub use postgres::PostgresProductCatalog;

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Look up several products; missing ids are simply absent from the result.
    async fn find_products(&self, ids: &[ProductId]) -> Result<HashMap<ProductId, Product>, StoreError> {
        let mut found = HashMap::with_capacity(ids.len());
        for id in ids {
            if found.contains_key(id) {
                continue;
            }
            if let Some(product) = self.find_product(*id).await? {
                found.insert(*id, product);
            }
        }
        Ok(found)
    }
}

#[async_trait]
impl<C> ProductCatalog for Arc<C>
where
    C: ProductCatalog + ?Sized,
{
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find_product(id).await
    }

    async fn find_products(&self, ids: &[ProductId]) -> Result<HashMap<ProductId, Product>, StoreError> {
        (**self).find_products(ids).await
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProductCatalog {
    inner: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let map = products.into_iter().map(|p| (p.id, p)).collect();
        Self { inner: RwLock::new(map) }
    }

    /// Insert or replace a product.
    pub fn upsert(&self, product: Product) -> Result<(), StoreError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("catalog lock poisoned".to_string()))?;
        map.insert(product.id, product);
        Ok(())
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("catalog lock poisoned".to_string()))?;
        Ok(map.get(&id).cloned())
    }
}
