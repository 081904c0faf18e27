use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use storefront_catalog::Product;
use storefront_core::ProductId;

use super::ProductCatalog;
use crate::store::postgres::{from_db_money, map_sqlx_error, to_db_money};
use crate::store::StoreError;

const PRODUCT_COLUMNS: &str = "id, name, price, image, company, category";

/// Catalog backed by the `products` table.
#[derive(Debug, Clone)]
pub struct PostgresProductCatalog {
    pool: Arc<PgPool>,
}

impl PostgresProductCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Insert or replace a product; used for seeding.
    pub async fn upsert(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, image, company, category)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                price = EXCLUDED.price,
                image = EXCLUDED.image,
                company = EXCLUDED.company,
                category = EXCLUDED.category
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(to_db_money("price", product.price)?)
        .bind(&product.image)
        .bind(&product.company)
        .bind(&product.category)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_product", e))?;
        Ok(())
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let get_err = |e: sqlx::Error| StoreError::Corrupt(format!("failed to decode product row: {e}"));
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id").map_err(get_err)?),
        name: row.try_get("name").map_err(get_err)?,
        price: from_db_money("price", row.try_get("price").map_err(get_err)?)?,
        image: row.try_get("image").map_err(get_err)?,
        company: row.try_get("company").map_err(get_err)?,
        category: row.try_get("category").map_err(get_err)?,
    })
}

#[async_trait]
impl ProductCatalog for PostgresProductCatalog {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    /// One round trip for the whole id set.
    async fn find_products(&self, ids: &[ProductId]) -> Result<HashMap<ProductId, Product>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"))
            .bind(&uuids)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_products", e))?;

        rows.iter()
            .map(|row| product_from_row(row).map(|product| (product.id, product)))
            .collect()
    }
}
