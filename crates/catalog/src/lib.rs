//! Catalog domain module.
//!
//! Product records and the stock arithmetic shared by the catalog and order
//! managers, implemented as plain data and pure functions (no IO, no HTTP, no storage).

pub mod product;

pub use product::{NewProduct, Product};
