//! Catalog manager: authoritative read/write access to product records.

use tracing::instrument;

use stockroom_catalog::Product;
use stockroom_core::{Entity, InventoryError, InventoryResult, ProductId};

use crate::store::{InventoryStore, StoreError};

#[derive(Debug, Clone)]
pub struct CatalogManager<S> {
    store: S,
}

impl<S> CatalogManager<S>
where
    S: InventoryStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All products, in store order.
    #[instrument(skip(self), err)]
    pub async fn list_products(&self) -> InventoryResult<Vec<Product>> {
        Ok(self.store.list_products().await?)
    }

    #[instrument(skip(self), err(level = "warn"))]
    pub async fn get_product(&self, id: ProductId) -> InventoryResult<Product> {
        self.store
            .find_product(id)
            .await?
            .ok_or_else(|| InventoryError::not_found(Entity::Product, id))
    }

    /// Overwrite a product's available quantity.
    ///
    /// No bounds are applied here; the store's column constraint rejects negative
    /// stock. Exactly one row must change, otherwise the write is reported as a
    /// storage failure (e.g. the product vanished between lookup and update).
    #[instrument(skip(self), err(level = "warn"))]
    pub async fn set_quantity(&self, id: ProductId, qty: i32) -> InventoryResult<()> {
        let product = self.get_product(id).await?;

        let affected = self.store.update_product_quantity(product.id, qty).await?;
        if affected != 1 {
            return Err(StoreError::UnexpectedRowCount {
                operation: "update_product_quantity",
                expected: 1,
                actual: affected,
            }
            .into());
        }

        tracing::info!(product_id = %id, previous = product.quantity, qty, "product quantity set");
        Ok(())
    }
}
