//! Inventory error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the catalog and ordering layers.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Kind of record a lookup was aimed at.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Entity {
    Product,
    Order,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Product => "product",
            Entity::Order => "order",
        }
    }
}

impl core::fmt::Display for Entity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every failure the catalog and order managers can report.
///
/// Each variant is produced at the point of failure and travels unmodified to the
/// boundary layer, which selects a response per variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// A product or order lookup matched no row.
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i32 },

    /// The product named by an order placement does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Order quantity below one.
    #[error("invalid order qty: {0}")]
    InvalidQuantity(i32),

    /// Order quantity exceeds what the product has available.
    #[error("quantity exceeds available product (requested {requested}, available {available})")]
    InsufficientStock { requested: i32, available: i32 },

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// I/O, decode or unexpected row-count failure in the backing store.
    #[error("storage error: {0}")]
    Storage(String),
}

impl InventoryError {
    pub fn not_found(entity: Entity, id: impl Into<i32>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// `true` for the variants that mean "the record is absent".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ProductNotFound(_))
    }
}
