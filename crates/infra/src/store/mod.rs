//! Inventory storage boundary.
//!
//! This module defines the storage contract the catalog and order managers consume,
//! plus the two backends that implement it (Postgres for deployments, in-memory for
//! tests and dev).

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;
pub use r#trait::{InventoryStore, ReservationOutcome, SharedStore, StoreError};
