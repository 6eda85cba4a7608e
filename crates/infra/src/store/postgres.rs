//! Postgres-backed inventory store.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (integrity constraint) | `23xxx` | `ConstraintViolation` |
//! | Database (other) | Any other | `Query` |
//! | PoolClosed / PoolTimedOut | N/A | `Unavailable` |
//! | ColumnDecode / ColumnNotFound / Decode | N/A | `Decode` |
//! | Other | N/A | `Query` |
//!
//! ## Reservation
//!
//! `reserve_and_record` runs the conditional decrement and the order insert in one
//! transaction. The decrement's `qty >= $1` predicate is re-checked by Postgres after
//! it takes the row lock, so concurrent placements against the same product are
//! serialised on that row and stock can never be driven below zero.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use tracing::field::Empty;
use tracing::{Span, instrument};

use stockroom_catalog::Product;
use stockroom_core::{OrderId, ProductId};
use stockroom_orders::{Order, OrderStatus};

use super::r#trait::{InventoryStore, ReservationOutcome, StoreError};

const ORDER_SELECT: &str = r#"
    SELECT
        orders.id AS order_id,
        orders.qty AS order_qty,
        order_statuses_enum.description AS status,
        products.id AS product_id,
        products.manufacturer,
        products.model_number,
        products.description,
        products.qty AS product_qty,
        products.lead_time
    FROM orders
    JOIN products ON products.id = orders.product_id
    JOIN order_statuses_enum ON orders.status_id = order_statuses_enum.id
"#;

/// Postgres-backed inventory store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and cheap to clone; each
/// request checks out its own connection.
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    #[instrument(skip(self), fields(product_count = Empty), err)]
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id AS product_id, manufacturer, model_number, description, qty AS product_qty, lead_time
            FROM products
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let product = ProductRow::from_row(&row)
                .map_err(|e| decode_error("list_products", e))?;
            products.push(product.into());
        }

        Span::current().record("product_count", products.len());
        Ok(products)
    }

    #[instrument(skip(self), err)]
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id AS product_id, manufacturer, model_number, description, qty AS product_qty, lead_time
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_product", e))?;

        row.map(|row| {
            ProductRow::from_row(&row)
                .map(Product::from)
                .map_err(|e| decode_error("find_product", e))
        })
        .transpose()
    }

    #[instrument(skip(self), err)]
    async fn update_product_quantity(&self, id: ProductId, qty: i32) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE products SET qty = $1 WHERE id = $2")
            .bind(qty)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_product_quantity", e))?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(&format!("{ORDER_SELECT} ORDER BY orders.id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_orders", e))?;

        rows.iter()
            .map(|row| decode_order("list_orders", row))
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(&format!("{ORDER_SELECT} WHERE orders.id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_order", e))?;

        row.map(|row| decode_order("find_order", &row)).transpose()
    }

    #[instrument(skip(self), fields(order_id = Empty), err)]
    async fn reserve_and_record(
        &self,
        product_id: ProductId,
        qty: i32,
    ) -> Result<ReservationOutcome, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let decremented = sqlx::query("UPDATE products SET qty = qty - $1 WHERE id = $2 AND qty >= $1")
            .bind(qty)
            .bind(product_id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("reserve_stock", e))?
            .rows_affected();

        if decremented != 1 {
            let available: Option<i32> = sqlx::query_scalar("SELECT qty FROM products WHERE id = $1")
                .bind(product_id.get())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("reread_stock", e))?;
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;

            if decremented > 1 {
                return Err(StoreError::UnexpectedRowCount {
                    operation: "reserve_stock",
                    expected: 1,
                    actual: decremented,
                });
            }
            return Ok(ReservationOutcome::Rejected { available });
        }

        let inserted: Option<i32> = sqlx::query_scalar(
            "INSERT INTO orders (product_id, qty) VALUES ($1, $2) RETURNING id",
        )
        .bind(product_id.get())
        .bind(qty)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;

        let Some(order_id) = inserted else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::UnexpectedRowCount {
                operation: "insert_order",
                expected: 1,
                actual: 0,
            });
        };

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Span::current().record("order_id", order_id);
        Ok(ReservationOutcome::Placed(OrderId::new(order_id)))
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_string();
            let integrity = db_err
                .code()
                .map(|code| code.starts_with("23"))
                .unwrap_or(false);
            if integrity {
                StoreError::ConstraintViolation { operation, message }
            } else {
                StoreError::Query { operation, message }
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("timed out acquiring a connection in {operation}"))
        }
        e @ (sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_)) => decode_error(operation, e),
        e => StoreError::Query {
            operation,
            message: e.to_string(),
        },
    }
}

fn decode_error(operation: &'static str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Decode {
        operation,
        message: err.to_string(),
    }
}

fn decode_order(operation: &'static str, row: &PgRow) -> Result<Order, StoreError> {
    let order = OrderRow::from_row(row).map_err(|e| decode_error(operation, e))?;
    let status = order
        .status
        .parse::<OrderStatus>()
        .map_err(|e| decode_error(operation, e))?;

    Ok(Order {
        id: OrderId::new(order.order_id),
        qty: order.order_qty,
        status,
        product: order.product.into(),
    })
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    product_id: i32,
    manufacturer: String,
    model_number: String,
    description: String,
    product_qty: i32,
    lead_time: String,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            product_id: row.try_get("product_id")?,
            manufacturer: row.try_get("manufacturer")?,
            model_number: row.try_get("model_number")?,
            description: row.try_get("description")?,
            product_qty: row.try_get("product_qty")?,
            lead_time: row.try_get("lead_time")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::new(row.product_id),
            manufacturer: row.manufacturer,
            model_number: row.model_number,
            description: row.description,
            quantity: row.product_qty,
            lead_time: row.lead_time,
        }
    }
}

#[derive(Debug)]
struct OrderRow {
    order_id: i32,
    order_qty: i32,
    status: String,
    product: ProductRow,
}

impl<'r> FromRow<'r, PgRow> for OrderRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderRow {
            order_id: row.try_get("order_id")?,
            order_qty: row.try_get("order_qty")?,
            status: row.try_get("status")?,
            product: ProductRow::from_row(row)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn connect() -> PostgresInventoryStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPool::connect(&url).await.expect("failed to connect");
        db::apply_schema(&pool).await.expect("failed to apply schema");
        PostgresInventoryStore::new(pool)
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a scratch Postgres database"]
    async fn reservation_round_trip_against_postgres() {
        let store = connect().await;

        let product_id: i32 = sqlx::query_scalar(
            "INSERT INTO products (manufacturer, model_number, description, qty, lead_time)
             VALUES ('Acme', 'W-100', 'Widget', 5, '2 weeks') RETURNING id",
        )
        .fetch_one(store.pool())
        .await
        .unwrap();
        let product_id = ProductId::new(product_id);

        let outcome = store.reserve_and_record(product_id, 3).await.unwrap();
        let ReservationOutcome::Placed(order_id) = outcome else {
            panic!("expected placement, got {outcome:?}");
        };

        let order = store.find_order(order_id).await.unwrap().unwrap();
        assert_eq!(order.qty, 3);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.product.quantity, 2);

        let outcome = store.reserve_and_record(product_id, 3).await.unwrap();
        assert_eq!(outcome, ReservationOutcome::Rejected { available: Some(2) });

        let err = store.update_product_quantity(product_id, -1).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation { .. }));
    }
}
