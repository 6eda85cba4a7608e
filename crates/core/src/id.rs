//! Strongly-typed identifiers used across the domain.
//!
//! Identities are assigned by the store (serial integer keys), so these are thin
//! wrappers over `i32` that keep product and order ids from being mixed up.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// Identifier of a catalog product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i32);

/// Identifier of a placed order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i32);

macro_rules! impl_serial_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: i32) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> i32 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i32> for $t {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i32 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = InventoryError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .parse::<i32>()
                    .map_err(|e| InventoryError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }
    };
}

impl_serial_newtype!(ProductId, "ProductId");
impl_serial_newtype!(OrderId, "OrderId");
