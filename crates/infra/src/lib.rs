//! Infrastructure layer: storage backends, config, and the catalog/order managers.

pub mod catalog;
pub mod config;
pub mod db;
pub mod ordering;
pub mod store;


pub use catalog::CatalogManager;
pub use config::AppConfig;
pub use ordering::OrderManager;
pub use store::{InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, SharedStore};
