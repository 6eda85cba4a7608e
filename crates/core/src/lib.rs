//! `stockroom-core`: shared building blocks for the inventory domain.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{Entity, InventoryError, InventoryResult};
pub use id::{OrderId, ProductId};
