//! Product catalog and stock lookups.
//!
//! # Architecture
//!
//! - The catalog service is the source of truth for product metadata and
//!   availability - the cart only ever reads from it
//! - Product metadata is cached in-memory via `moka`
//! - Stock is never cached, every check hits the service
//!
//! # Endpoints
//!
//! - `GET {api_url}/products/{id}` - product metadata
//! - `GET {api_url}/stock/{id}` - available quantity

mod client;

pub use client::ApiClient;

use async_trait::async_trait;
use rocketshoes_core::{Product, ProductId, StockEntry};
use thiserror::Error;

/// Errors that can occur when looking up products or stock.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The configured token cannot be sent as a header.
    #[error("Invalid API token: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Read-only product metadata lookup.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch a product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on network, status or parse failures.
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError>;
}

/// Read-only lookup of currently available quantity.
#[async_trait]
pub trait StockOracle: Send + Sync {
    /// Fetch the stock entry for a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on network, status or parse failures.
    async fn stock(&self, id: ProductId) -> Result<StockEntry, CatalogError>;
}
