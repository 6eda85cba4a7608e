//! Order manager: enforces the inventory invariant and records orders.
//!
//! ```text
//! place_order(product_id, qty)
//!   ↓
//! Validating   resolve product via the catalog, check qty >= 1 and qty <= stock
//!   ↓
//! Reserving    conditional decrement (qty >= requested)   ┐ one store
//!   ↓                                                     │ transaction
//! Committing   insert pending order                      ┘
//!   ↓
//! Done
//! ```
//!
//! Any step can end the attempt in `Failed` with the error captured at that step.
//! Validation reads a snapshot that may be stale by the time the store runs; the
//! store re-checks stock atomically, so a stale read yields `InsufficientStock`
//! rather than negative stock.

use tracing::field::Empty;
use tracing::{Span, instrument};

use stockroom_core::{Entity, InventoryError, InventoryResult, OrderId, ProductId};
use stockroom_orders::{Order, PlaceOrder, PlacementStage, validate_placement};

use crate::catalog::CatalogManager;
use crate::store::{InventoryStore, ReservationOutcome};

#[derive(Debug, Clone)]
pub struct OrderManager<S> {
    catalog: CatalogManager<S>,
    store: S,
}

impl<S> OrderManager<S>
where
    S: InventoryStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            catalog: CatalogManager::new(store.clone()),
            store,
        }
    }

    pub fn catalog(&self) -> &CatalogManager<S> {
        &self.catalog
    }

    /// All orders, each with its product as currently stored.
    #[instrument(skip(self), err)]
    pub async fn list_orders(&self) -> InventoryResult<Vec<Order>> {
        Ok(self.store.list_orders().await?)
    }

    #[instrument(skip(self), err(level = "warn"))]
    pub async fn get_order(&self, id: OrderId) -> InventoryResult<Order> {
        self.store
            .find_order(id)
            .await?
            .ok_or_else(|| InventoryError::not_found(Entity::Order, id))
    }

    /// Place an order for `qty` units of `product_id`.
    ///
    /// Not idempotent: every successful call creates a new order and takes stock.
    #[instrument(skip(self), fields(stage = Empty))]
    pub async fn place_order(&self, product_id: ProductId, qty: i32) -> InventoryResult<OrderId> {
        let mut stage = PlacementStage::Validating;
        let result = self.run_placement(PlaceOrder { product_id, qty }, &mut stage).await;

        let stage = match &result {
            Ok(_) => stage,
            Err(err) => {
                tracing::warn!(failed_at = %stage, error = %err, "order placement failed");
                PlacementStage::Failed
            }
        };
        Span::current().record("stage", stage.as_str());

        result
    }

    async fn run_placement(
        &self,
        cmd: PlaceOrder,
        stage: &mut PlacementStage,
    ) -> InventoryResult<OrderId> {
        let product = match self.catalog.get_product(cmd.product_id).await {
            Ok(p) => p,
            Err(e) if e.is_not_found() => return Err(InventoryError::ProductNotFound(cmd.product_id)),
            Err(e) => return Err(e),
        };
        let reservation = validate_placement(&product, cmd.qty)?;
        *stage = stage.advance();

        // Reserving and Committing are applied by the store as one unit; a miss
        // on the conditional decrement ends the attempt while still reserving.
        let outcome = self
            .store
            .reserve_and_record(reservation.product_id, reservation.qty)
            .await?;

        match outcome {
            ReservationOutcome::Placed(order_id) => {
                *stage = stage.advance().advance();
                tracing::info!(
                    %order_id,
                    product_id = %reservation.product_id,
                    qty = reservation.qty,
                    "order placed"
                );
                Ok(order_id)
            }
            ReservationOutcome::Rejected { available: Some(available) } => {
                Err(InventoryError::InsufficientStock {
                    requested: reservation.qty,
                    available,
                })
            }
            ReservationOutcome::Rejected { available: None } => {
                Err(InventoryError::ProductNotFound(reservation.product_id))
            }
        }
    }
}
