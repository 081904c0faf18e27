//! Postgres-backed order and review stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Second review for the same `(product_id, user_id)` |
//! | Database (check constraint violation) | `23514` | `Corrupt` | Negative money or out-of-range rating |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | PoolClosed | N/A | `Backend` | Connection pool was closed |
//! | Other | N/A | `Backend` | Network errors, connection failures, etc. |
//!
//! Money columns are `BIGINT`; values outside `i64` are rejected before they reach SQL.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use storefront_core::{OrderId, ProductId, ReviewId, UserId};
use storefront_orders::{Order, OrderItem, OrderParts, OrderStatus};
use storefront_reviews::{Rating, Review, ReviewContent, ReviewParts};

use super::{OrderFilter, OrderStore, ReviewFilter, ReviewStore, StoreError};

/// Tables for products, orders and reviews. Idempotent.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id          UUID PRIMARY KEY,
    name        TEXT NOT NULL,
    price       BIGINT NOT NULL CHECK (price >= 0),
    image       TEXT NOT NULL,
    company     TEXT NOT NULL,
    category    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    id                  UUID PRIMARY KEY,
    user_id             UUID NOT NULL,
    items               JSONB NOT NULL,
    subtotal            BIGINT NOT NULL CHECK (subtotal >= 0),
    tax                 BIGINT NOT NULL CHECK (tax >= 0),
    shipping_fee        BIGINT NOT NULL CHECK (shipping_fee >= 0),
    total               BIGINT NOT NULL CHECK (total >= 0),
    client_secret       TEXT NOT NULL,
    payment_intent_id   TEXT,
    status              TEXT NOT NULL,
    created_at          TIMESTAMPTZ NOT NULL,
    updated_at          TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS orders_user_id_idx ON orders (user_id);

CREATE TABLE IF NOT EXISTS reviews (
    id          UUID PRIMARY KEY,
    product_id  UUID NOT NULL,
    user_id     UUID NOT NULL,
    rating      SMALLINT NOT NULL CHECK (rating BETWEEN 1 AND 5),
    title       TEXT NOT NULL,
    comment     TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL,
    CONSTRAINT reviews_product_user_key UNIQUE (product_id, user_id)
);
"#;

/// Apply [`SCHEMA`].
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("migrate", e))?;
    Ok(())
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23514") => StoreError::Corrupt(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

pub(crate) fn to_db_money(field: &str, value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::Corrupt(format!("{field} {value} exceeds BIGINT range")))
}

pub(crate) fn from_db_money(field: &str, value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Corrupt(format!("{field} {value} is negative")))
}

fn decode(operation: &str, err: sqlx::Error) -> StoreError {
    StoreError::Corrupt(format!("failed to decode row in {operation}: {err}"))
}

#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: Arc<PgPool>,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

const ORDER_COLUMNS: &str = "id, user_id, items, subtotal, tax, shipping_fee, total, \
                             client_secret, payment_intent_id, status, created_at, updated_at";

fn order_from_row(row: &PgRow) -> Result<Order, StoreError> {
    let get_err = |e| decode("order", e);

    let status: String = row.try_get("status").map_err(get_err)?;
    let status: OrderStatus = status
        .parse()
        .map_err(|e| StoreError::Corrupt(format!("order status: {e}")))?;
    let Json(items): Json<Vec<OrderItem>> = row.try_get("items").map_err(get_err)?;

    let parts = OrderParts {
        id: OrderId::from_uuid(row.try_get("id").map_err(get_err)?),
        items,
        subtotal: from_db_money("subtotal", row.try_get("subtotal").map_err(get_err)?)?,
        tax: from_db_money("tax", row.try_get("tax").map_err(get_err)?)?,
        shipping_fee: from_db_money("shipping_fee", row.try_get("shipping_fee").map_err(get_err)?)?,
        total: from_db_money("total", row.try_get("total").map_err(get_err)?)?,
        client_secret: row.try_get("client_secret").map_err(get_err)?,
        payment_intent_id: row.try_get("payment_intent_id").map_err(get_err)?,
        status,
        user: UserId::from_uuid(row.try_get("user_id").map_err(get_err)?),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(get_err)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(get_err)?,
    };

    Order::restore(parts).map_err(|e| StoreError::Corrupt(e.to_string()))
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[instrument(skip(self, order), fields(order_id = %order.id_typed()), err)]
    async fn insert(&self, order: Order) -> Result<Order, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, items, subtotal, tax, shipping_fee, total,
                client_secret, payment_intent_id, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(order.id_typed().as_uuid())
        .bind(order.user().as_uuid())
        .bind(Json(order.items()))
        .bind(to_db_money("subtotal", order.subtotal())?)
        .bind(to_db_money("tax", order.tax())?)
        .bind(to_db_money("shipping_fee", order.shipping_fee())?)
        .bind(to_db_money("total", order.total())?)
        .bind(order.client_secret())
        .bind(order.payment_intent_id())
        .bind(order.status().as_str())
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;

        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_order", e))?;

        row.as_ref().map(order_from_row).transpose()
    }

    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError> {
        let rows = match filter {
            OrderFilter::All => {
                sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at, id"))
                    .fetch_all(&*self.pool)
                    .await
            }
            OrderFilter::Owner(user) => {
                sqlx::query(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at, id"
                ))
                .bind(user.as_uuid())
                .fetch_all(&*self.pool)
                .await
            }
        }
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        rows.iter().map(order_from_row).collect()
    }

    /// Only the payment fields are mutable after creation. The status check in
    /// the `WHERE` clause makes the transition a compare-and-swap.
    #[instrument(skip(self, order), fields(order_id = %order.id_typed()), err)]
    async fn save(&self, order: Order, expected: OrderStatus) -> Result<Order, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET payment_intent_id = $2, status = $3, updated_at = $4
            WHERE id = $1 AND status = $5
            "#,
        )
        .bind(order.id_typed().as_uuid())
        .bind(order.payment_intent_id())
        .bind(order.status().as_str())
        .bind(order.updated_at())
        .bind(expected.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_order", e))?;

        if result.rows_affected() > 0 {
            return Ok(order);
        }

        let current: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
            .bind(order.id_typed().as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("save_order", e))?;

        match current {
            Some(status) => Err(StoreError::Conflict(format!(
                "order {} is {status}, expected {}",
                order.id_typed(),
                expected.as_str()
            ))),
            None => Err(StoreError::Missing(format!("order {}", order.id_typed()))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresReviewStore {
    pool: Arc<PgPool>,
}

impl PostgresReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

const REVIEW_COLUMNS: &str = "id, product_id, user_id, rating, title, comment, created_at, updated_at";

fn review_from_row(row: &PgRow) -> Result<Review, StoreError> {
    let get_err = |e| decode("review", e);

    let rating: i16 = row.try_get("rating").map_err(get_err)?;
    let rating = u8::try_from(rating)
        .map_err(|_| StoreError::Corrupt(format!("review rating {rating} out of range")))
        .and_then(|r| Rating::new(r).map_err(|e| StoreError::Corrupt(e.to_string())))?;

    Ok(Review::restore(ReviewParts {
        id: ReviewId::from_uuid(row.try_get("id").map_err(get_err)?),
        product: ProductId::from_uuid(row.try_get("product_id").map_err(get_err)?),
        user: UserId::from_uuid(row.try_get("user_id").map_err(get_err)?),
        content: ReviewContent {
            rating,
            title: row.try_get("title").map_err(get_err)?,
            comment: row.try_get("comment").map_err(get_err)?,
        },
        created_at: row.try_get("created_at").map_err(get_err)?,
        updated_at: row.try_get("updated_at").map_err(get_err)?,
    }))
}

#[async_trait]
impl ReviewStore for PostgresReviewStore {
    /// Relies on `reviews_product_user_key`; a racing duplicate surfaces as `23505`.
    #[instrument(skip(self, review), fields(review_id = %review.id_typed()), err)]
    async fn insert(&self, review: Review) -> Result<Review, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, product_id, user_id, rating, title, comment, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(review.id_typed().as_uuid())
        .bind(review.product().as_uuid())
        .bind(review.user().as_uuid())
        .bind(i16::from(review.rating().value()))
        .bind(review.title())
        .bind(review.comment())
        .bind(review.created_at())
        .bind(review.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_review", e))?;

        Ok(review)
    }

    async fn get(&self, id: ReviewId) -> Result<Option<Review>, StoreError> {
        let row = sqlx::query(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_review", e))?;

        row.as_ref().map(review_from_row).transpose()
    }

    async fn find_by_product_and_user(
        &self,
        product: ProductId,
        user: UserId,
    ) -> Result<Option<Review>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE product_id = $1 AND user_id = $2"
        ))
        .bind(product.as_uuid())
        .bind(user.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_review", e))?;

        row.as_ref().map(review_from_row).transpose()
    }

    async fn list(&self, filter: ReviewFilter) -> Result<Vec<Review>, StoreError> {
        let rows = match filter {
            ReviewFilter::All => {
                sqlx::query(&format!("SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at, id"))
                    .fetch_all(&*self.pool)
                    .await
            }
            ReviewFilter::Product(product) => {
                sqlx::query(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews WHERE product_id = $1 ORDER BY created_at, id"
                ))
                .bind(product.as_uuid())
                .fetch_all(&*self.pool)
                .await
            }
        }
        .map_err(|e| map_sqlx_error("list_reviews", e))?;

        rows.iter().map(review_from_row).collect()
    }

    #[instrument(skip(self, review), fields(review_id = %review.id_typed()), err)]
    async fn save(&self, review: Review) -> Result<Review, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE reviews
            SET rating = $2, title = $3, comment = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(review.id_typed().as_uuid())
        .bind(i16::from(review.rating().value()))
        .bind(review.title())
        .bind(review.comment())
        .bind(review.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_review", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(format!("review {}", review.id_typed())));
        }
        Ok(review)
    }

    async fn delete(&self, id: ReviewId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_review", e))?;

        Ok(result.rows_affected() > 0)
    }
}
