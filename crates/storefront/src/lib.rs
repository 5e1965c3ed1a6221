//! RocketShoes Storefront library.
//!
//! The cart store, its collaborators and the JSON API the SPA talks to. The
//! binary in `main.rs` only wires configuration, tracing and Sentry around
//! [`routes::app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod notify;
pub mod routes;
pub mod state;
pub mod storage;
