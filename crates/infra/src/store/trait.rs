use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_catalog::Product;
use stockroom_core::{InventoryError, OrderId, ProductId};
use stockroom_orders::Order;

/// Failure reported by a storage backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("query failed in {operation}: {message}")]
    Query {
        operation: &'static str,
        message: String,
    },

    #[error("failed to decode row in {operation}: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} affected {actual} rows (expected {expected})")]
    UnexpectedRowCount {
        operation: &'static str,
        expected: u64,
        actual: u64,
    },

    #[error("constraint violated in {operation}: {message}")]
    ConstraintViolation {
        operation: &'static str,
        message: String,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for InventoryError {
    fn from(value: StoreError) -> Self {
        InventoryError::Storage(value.to_string())
    }
}

/// Result of an atomic reserve-and-record attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReservationOutcome {
    /// Stock was decremented and the order row inserted, committed together.
    Placed(OrderId),
    /// The conditional decrement matched no row; nothing was written.
    ///
    /// `available` is the quantity re-read after the miss, `None` if the product is gone.
    Rejected { available: Option<i32> },
}

/// Relational storage for products and orders.
///
/// Every call executes directly against the backing store; there is no caching
/// layer. Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// All products, in the store's native order.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// A single product, or `None` when no row matches.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Overwrite a product's quantity. Returns the number of rows affected.
    async fn update_product_quantity(&self, id: ProductId, qty: i32) -> Result<u64, StoreError>;

    /// All orders, each joined with its product and status.
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    /// A single order with its product, or `None` when no row matches.
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Take `qty` units from a product and record a pending order for them.
    ///
    /// The decrement is conditional on `qty` units still being available and is
    /// committed in the same unit as the order insert: either both land or neither does.
    async fn reserve_and_record(
        &self,
        product_id: ProductId,
        qty: i32,
    ) -> Result<ReservationOutcome, StoreError>;
}

/// Type-erased store handle shared by the managers and the HTTP layer.
pub type SharedStore = Arc<dyn InventoryStore>;

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_products().await
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find_product(id).await
    }

    async fn update_product_quantity(&self, id: ProductId, qty: i32) -> Result<u64, StoreError> {
        (**self).update_product_quantity(id, qty).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        (**self).list_orders().await
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        (**self).find_order(id).await
    }

    async fn reserve_and_record(
        &self,
        product_id: ProductId,
        qty: i32,
    ) -> Result<ReservationOutcome, StoreError> {
        (**self).reserve_and_record(product_id, qty).await
    }
}
