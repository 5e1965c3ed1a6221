//! Core types for RocketShoes.
//!
//! This module provides type-safe wrappers for the catalog domain.

pub mod id;
pub mod price;
pub mod product;

pub use id::*;
pub use price::{CurrencyCode, Price, UnknownCurrency};
pub use product::{Product, StockEntry};
