//! The shopping cart line-item collection.
//!
//! A [`Cart`] is an immutable value: every mutation builds a new cart, which
//! lets the store swap the whole collection in a single step. Equality ignores
//! line-item order, since a cart is keyed by product id.
//!
//! # Storage encoding
//!
//! The cart is stored as a JSON array of products. Decoding validates the
//! schema explicitly and rejects duplicates and non-positive quantities, so a
//! decoded cart always satisfies the cart invariants.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Product, ProductId};

/// Errors raised when stored cart content cannot be trusted.
#[derive(Debug, Error)]
pub enum CartDecodeError {
    /// Content is not a JSON array of products.
    #[error("malformed cart JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The same product appears more than once.
    #[error("duplicate line item for product {0}")]
    DuplicateProduct(ProductId),

    /// A line item has a zero quantity.
    #[error("line item for product {0} has no quantity")]
    EmptyLineItem(ProductId),
}

/// The user's selected products with their quantities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Product>", into = "Vec<Product>")]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Decode a cart from its stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns `CartDecodeError` if the content is not a JSON array of
    /// products, or if it violates the one-line-per-product or positive
    /// quantity invariants.
    pub fn decode(raw: &str) -> Result<Self, CartDecodeError> {
        let items: Vec<Product> = serde_json::from_str(raw)?;
        Self::try_from(items)
    }

    /// Encode the cart to its stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if a display field cannot be serialized.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Find the line item for a product.
    #[must_use]
    pub fn find(&self, product_id: ProductId) -> Option<&Product> {
        self.items.iter().find(|item| item.id == product_id)
    }

    /// Line items in their current order.
    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line-item quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line-item subtotals, capped at `Decimal::MAX`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(Product::subtotal)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Build a new cart with `item` replacing any line for the same product.
    ///
    /// The replaced line moves to the end, matching how the storefront lists
    /// the most recently touched product last. A zero quantity drops the line.
    #[must_use]
    pub fn with_item(&self, item: Product) -> Self {
        let mut items: Vec<Product> = self
            .items
            .iter()
            .filter(|existing| existing.id != item.id)
            .cloned()
            .collect();
        if item.amount > 0 {
            items.push(item);
        }
        Self { items }
    }
}

impl TryFrom<Vec<Product>> for Cart {
    type Error = CartDecodeError;

    fn try_from(items: Vec<Product>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(CartDecodeError::DuplicateProduct(item.id));
            }
            if item.amount == 0 {
                return Err(CartDecodeError::EmptyLineItem(item.id));
            }
        }
        Ok(Self { items })
    }
}

impl From<Cart> for Vec<Product> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl PartialEq for Cart {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .all(|item| other.find(item.id) == Some(item))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(id: i32, amount: u32) -> Product {
        serde_json::from_value(json!({
            "id": id,
            "title": format!("Shoe {id}"),
            "price": 100.5,
            "image": "",
            "amount": amount
        }))
        .unwrap()
    }

    #[test]
    fn test_with_item_inserts_new_line() {
        let cart = Cart::empty().with_item(product(5, 1));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.find(ProductId::new(5)).unwrap().amount, 1);
    }

    #[test]
    fn test_with_item_replaces_existing_line() {
        let cart = Cart::try_from(vec![product(1, 1), product(2, 3)]).unwrap();
        let updated = cart.with_item(product(1, 4));

        assert_eq!(updated.len(), 2);
        assert_eq!(updated.find(ProductId::new(1)).unwrap().amount, 4);
        assert_eq!(updated.items().last().unwrap().id, ProductId::new(1));
        // The source cart is left untouched.
        assert_eq!(cart.find(ProductId::new(1)).unwrap().amount, 1);
    }

    #[test]
    fn test_with_item_zero_amount_drops_line() {
        let cart = Cart::try_from(vec![product(1, 1)]).unwrap();
        assert!(cart.with_item(product(1, 0)).is_empty());
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = Cart::try_from(vec![product(1, 1), product(2, 2)]).unwrap();
        let b = Cart::try_from(vec![product(2, 2), product(1, 1)]).unwrap();
        assert_eq!(a, b);

        let c = Cart::try_from(vec![product(2, 3), product(1, 1)]).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_storage_round_trip() {
        let cart = Cart::try_from(vec![product(3, 2), product(1, 1)]).unwrap();
        let decoded = Cart::decode(&cart.encode().unwrap()).unwrap();
        assert_eq!(decoded, cart);
    }

    #[test]
    fn test_decode_rejects_duplicates() {
        let raw = json!([product(1, 1), product(1, 2)]).to_string();
        assert!(matches!(
            Cart::decode(&raw),
            Err(CartDecodeError::DuplicateProduct(id)) if id == ProductId::new(1)
        ));
    }

    #[test]
    fn test_decode_rejects_empty_line_items() {
        let raw = json!([product(4, 0)]).to_string();
        assert!(matches!(
            Cart::decode(&raw),
            Err(CartDecodeError::EmptyLineItem(_))
        ));
    }

    #[test]
    fn test_decode_rejects_negative_amounts_and_garbage() {
        let negative = r#"[{"id":1,"title":"Shoe","price":1,"image":"","amount":-1}]"#;
        assert!(matches!(
            Cart::decode(negative),
            Err(CartDecodeError::Json(_))
        ));
        assert!(Cart::decode("{\"not\":\"a list\"}").is_err());
        assert!(Cart::decode("").is_err());
    }

    #[test]
    fn test_serde_deserialize_validates() {
        let result: Result<Cart, _> = serde_json::from_value(json!([product(1, 1), product(1, 1)]));
        assert!(result.is_err());
    }

    #[test]
    fn test_totals() {
        let cart = Cart::try_from(vec![product(1, 2), product(2, 1)]).unwrap();
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.total(), Decimal::new(3015, 1));
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let raw = r#"[
            {"id": 1, "title": "Shoe", "price": 40000000000000000000000000000, "image": "", "amount": 2},
            {"id": 2, "title": "Boot", "price": 1, "image": "", "amount": 1}
        ]"#;
        let cart = Cart::decode(raw).unwrap();

        assert_eq!(cart.find(ProductId::new(1)).unwrap().subtotal(), Decimal::MAX);
        assert_eq!(cart.total(), Decimal::MAX);
    }
}
