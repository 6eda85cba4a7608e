//! Orders domain module.
//!
//! Order records, the status enumeration, and the pure decision logic behind
//! order placement (no IO, no HTTP, no storage).

pub mod order;
pub mod placement;

pub use order::{Order, OrderStatus};
pub use placement::{PlaceOrder, PlacementStage, Reservation, validate_placement};
