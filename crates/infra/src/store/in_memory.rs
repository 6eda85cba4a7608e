use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use stockroom_catalog::{NewProduct, Product};
use stockroom_core::{OrderId, ProductId};
use stockroom_orders::{Order, OrderStatus};

use super::r#trait::{InventoryStore, ReservationOutcome, StoreError};

#[derive(Debug, Clone)]
struct OrderRow {
    product_id: ProductId,
    qty: i32,
    status: OrderStatus,
}

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, OrderRow>,
    last_product_id: i32,
    last_order_id: i32,
}

impl Tables {
    fn join(&self, id: OrderId, row: &OrderRow) -> Option<Order> {
        let product = self.products.get(&row.product_id)?;
        Some(Order {
            id,
            qty: row.qty,
            status: row.status,
            product: product.clone(),
        })
    }
}

/// In-memory inventory store.
///
/// Intended for tests/dev. Mirrors the relational schema's constraints (serial ids,
/// non-negative stock, positive order quantities) so the managers see the same
/// failures they would against Postgres.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `products`, assigned ids `1..=n` in order.
    ///
    /// Seeds go through [`Self::insert_product`], so negative stock is rejected here too.
    pub fn with_products(
        products: impl IntoIterator<Item = NewProduct>,
    ) -> Result<Self, StoreError> {
        let store = Self::new();
        for p in products {
            store.insert_product(p)?;
        }
        Ok(store)
    }

    /// Small sample catalog used when no database is configured.
    pub fn demo() -> Result<Self, StoreError> {
        Self::with_products([
            NewProduct::new("Acme", "RX-1000", "Rack-mount router", 25, "1-2 weeks"),
            NewProduct::new("Acme", "SW-24P", "24-port PoE switch", 10, "3-5 days"),
            NewProduct::new("Globex", "AP-6E", "Wi-Fi 6E access point", 40, "2 weeks"),
            NewProduct::new("Initech", "UPS-1500", "1500VA line-interactive UPS", 5, "4-6 weeks"),
        ])
    }

    /// Add a product, assigning the next serial id.
    pub fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        if product.quantity < 0 {
            return Err(negative_stock("insert_product"));
        }
        let mut tables = self.write()?;
        tables.last_product_id += 1;
        let id = ProductId::new(tables.last_product_id);
        let product = product.into_product(id);
        tables.products.insert(id, product.clone());
        Ok(product)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

fn negative_stock(operation: &'static str) -> StoreError {
    StoreError::ConstraintViolation {
        operation,
        message: "products.qty must be >= 0".to_string(),
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.read()?.products.values().cloned().collect())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn update_product_quantity(&self, id: ProductId, qty: i32) -> Result<u64, StoreError> {
        if qty < 0 {
            return Err(negative_stock("update_product_quantity"));
        }
        let mut tables = self.write()?;
        match tables.products.get_mut(&id) {
            Some(product) => {
                product.quantity = qty;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .orders
            .iter()
            .filter_map(|(id, row)| tables.join(*id, row))
            .collect())
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let tables = self.read()?;
        Ok(tables.orders.get(&id).and_then(|row| tables.join(id, row)))
    }

    async fn reserve_and_record(
        &self,
        product_id: ProductId,
        qty: i32,
    ) -> Result<ReservationOutcome, StoreError> {
        if qty <= 0 {
            return Err(StoreError::ConstraintViolation {
                operation: "insert_order",
                message: "orders.qty must be > 0".to_string(),
            });
        }

        // The write lock is held across decrement and insert, so the pair is
        // linearised against every other reservation.
        let mut tables = self.write()?;

        let Some(product) = tables.products.get_mut(&product_id) else {
            return Ok(ReservationOutcome::Rejected { available: None });
        };
        if product.quantity < qty {
            return Ok(ReservationOutcome::Rejected {
                available: Some(product.quantity),
            });
        }
        product.quantity -= qty;

        tables.last_order_id += 1;
        let order_id = OrderId::new(tables.last_order_id);
        tables.orders.insert(
            order_id,
            OrderRow {
                product_id,
                qty,
                status: OrderStatus::Pending,
            },
        );

        Ok(ReservationOutcome::Placed(order_id))
    }
}
