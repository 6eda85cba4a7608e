//! Order placement decision logic.
//!
//! Placement runs as `Validating → Reserving → Committing → Done`; any step may end
//! in `Failed`, and nothing is retried. Validation is pure and lives here. The
//! reserve and commit steps belong to the store, which must apply them as one unit.

use serde::{Deserialize, Serialize};

use stockroom_catalog::Product;
use stockroom_core::{InventoryError, ProductId};

/// Request to place an order for `qty` units of a product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub product_id: ProductId,
    pub qty: i32,
}

/// A validated placement: `qty` units may be taken from `product_id`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub product_id: ProductId,
    pub qty: i32,
}

/// Step of a single placement attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlacementStage {
    Validating,
    Reserving,
    Committing,
    Done,
    Failed,
}

impl PlacementStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementStage::Validating => "validating",
            PlacementStage::Reserving => "reserving",
            PlacementStage::Committing => "committing",
            PlacementStage::Done => "done",
            PlacementStage::Failed => "failed",
        }
    }

    /// Stage that follows a successful step. Terminal stages stay put.
    pub fn advance(self) -> Self {
        match self {
            PlacementStage::Validating => PlacementStage::Reserving,
            PlacementStage::Reserving => PlacementStage::Committing,
            PlacementStage::Committing => PlacementStage::Done,
            PlacementStage::Done => PlacementStage::Done,
            PlacementStage::Failed => PlacementStage::Failed,
        }
    }
}

impl core::fmt::Display for PlacementStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check a requested quantity against the product as currently read.
///
/// Quantity below one is rejected before stock is considered.
pub fn validate_placement(product: &Product, qty: i32) -> Result<Reservation, InventoryError> {
    if qty < 1 {
        return Err(InventoryError::InvalidQuantity(qty));
    }

    if product.remaining_after(qty).is_none() {
        return Err(InventoryError::InsufficientStock {
            requested: qty,
            available: product.quantity,
        });
    }

    Ok(Reservation {
        product_id: product.id,
        qty,
    })
}
