//! Service wiring: picks the storage backend and seeds the catalog.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use storefront_catalog::{NewProduct, Product};
use storefront_core::Currency;
use storefront_infra::catalog::{InMemoryProductCatalog, PostgresProductCatalog, ProductCatalog};
use storefront_infra::payment::{FakePaymentAuthorizer, PaymentAuthorizer};
use storefront_infra::services::{OrderService, ReviewService};
use storefront_infra::store::{
    self, InMemoryOrderStore, InMemoryReviewStore, OrderStore, PostgresOrderStore, PostgresReviewStore, ReviewStore,
};

use crate::config::ApiConfig;

pub type Orders = OrderService<Arc<dyn ProductCatalog>, Arc<dyn PaymentAuthorizer>, Arc<dyn OrderStore>>;
pub type Reviews = ReviewService<Arc<dyn ProductCatalog>, Arc<dyn ReviewStore>>;

/// Everything the handlers need, shared through an `Extension`.
pub struct AppServices {
    pub orders: Orders,
    pub reviews: Reviews,
}

impl AppServices {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        payments: Arc<dyn PaymentAuthorizer>,
        order_store: Arc<dyn OrderStore>,
        review_store: Arc<dyn ReviewStore>,
        currency: Currency,
    ) -> Self {
        Self {
            orders: OrderService::new(catalog.clone(), payments, order_store, currency),
            reviews: ReviewService::new(catalog, review_store),
        }
    }

    /// In-memory stores (dev/test) over a fixed product list.
    pub fn in_memory(products: Vec<Product>, currency: Currency) -> Self {
        Self::new(
            Arc::new(InMemoryProductCatalog::from_products(products)),
            Arc::new(FakePaymentAuthorizer),
            Arc::new(InMemoryOrderStore::new()),
            Arc::new(InMemoryReviewStore::new()),
            currency,
        )
    }
}

pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let products = match &config.catalog_seed_path {
        Some(path) => load_catalog_seed(path)?,
        None => Vec::new(),
    };

    let Some(url) = &config.database_url else {
        tracing::info!(products = products.len(), "using in-memory stores");
        return Ok(AppServices::in_memory(products, config.currency.clone()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .context("failed to connect to DATABASE_URL")?;
    store::postgres::migrate(&pool).await?;

    let catalog = PostgresProductCatalog::new(pool.clone());
    for product in &products {
        catalog.upsert(product).await?;
    }
    tracing::info!(seeded = products.len(), "using postgres stores");

    Ok(AppServices::new(
        Arc::new(catalog),
        Arc::new(FakePaymentAuthorizer),
        Arc::new(PostgresOrderStore::new(pool.clone())),
        Arc::new(PostgresReviewStore::new(pool)),
        config.currency.clone(),
    ))
}

/// Read a JSON array of products.
pub fn load_catalog_seed(path: &Path) -> anyhow::Result<Vec<Product>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog seed {}", path.display()))?;
    parse_catalog_seed(&raw).with_context(|| format!("invalid catalog seed {}", path.display()))
}

pub fn parse_catalog_seed(raw: &str) -> anyhow::Result<Vec<Product>> {
    let seed: Vec<NewProduct> = serde_json::from_str(raw)?;
    let products = seed
        .into_iter()
        .map(NewProduct::into_product)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seed_with_defaults() {
        let products = parse_catalog_seed(
            r#"[
                {"name": "accent chair", "price": 25999, "company": "marcos", "category": "office"},
                {"id": "0190a1b2-c3d4-7e5f-8a9b-0c1d2e3f4a5b", "name": "sofa", "price": 99}
            ]"#,
        )
        .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].image, "/uploads/example.jpeg");
        assert_eq!(products[1].id.to_string(), "0190a1b2-c3d4-7e5f-8a9b-0c1d2e3f4a5b");
    }

    #[test]
    fn rejects_blank_names() {
        assert!(parse_catalog_seed(r#"[{"name": "  ", "price": 1}]"#).is_err());
    }
}
