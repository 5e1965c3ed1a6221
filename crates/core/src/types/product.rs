//! Catalog products and stock entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ProductId;

/// A catalog product, optionally carrying the quantity held in a cart.
///
/// Catalog responses have no `amount`, so it defaults to zero. Display fields
/// the cart does not interpret are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    /// Quantity of this product in the cart.
    #[serde(default)]
    pub amount: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Return a copy of this product with a different cart quantity.
    #[must_use]
    pub fn with_amount(&self, amount: u32) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }

    /// Unit price multiplied by the cart quantity, capped at `Decimal::MAX`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.amount))
    }
}

/// Quantity of a product currently available for purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub id: ProductId,
    pub amount: u32,
}

impl StockEntry {
    /// Whether `requested` units can be served from this stock.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        self.amount >= requested
    }
}
