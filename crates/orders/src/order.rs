use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockroom_catalog::Product;
use stockroom_core::{InventoryError, OrderId};

/// Order lifecycle status, resolved from the status lookup table.
///
/// Only `Pending` is ever assigned here (at creation); the remaining states exist
/// in the lookup table for downstream fulfilment tooling.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Fulfilled,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Fulfilled,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Fulfilled => "fulfilled",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InventoryError::storage(format!("unknown order status '{s}'")))
    }
}

/// A placed order, carrying the product it references as read alongside it.
///
/// `product` is the catalog row at read time, not a copy frozen at placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub qty: i32,
    pub status: OrderStatus,
    pub product: Product,
}
