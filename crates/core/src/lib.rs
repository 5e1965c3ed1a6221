//! RocketShoes Core - Shared cart and catalog types.
//!
//! This crate provides the types shared by every RocketShoes component:
//! - `storefront` - Cart store, catalog client and the JSON API for the SPA
//! - `integration-tests` - End-to-end tests of the storefront API
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no storage
//! access, no HTTP clients. Cart decoding and validation live here so that any
//! storage backend can reuse them.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, products and stock entries
//! - [`cart`] - The cart line-item collection and its storage encoding

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartDecodeError};
pub use types::*;
