//! HTTP client for the catalog and stock service.
//!
//! Uses `reqwest` for HTTP and caches product metadata with `moka`.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use rocketshoes_core::{Product, ProductId, StockEntry};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{CatalogError, ProductCatalog, StockOracle};
use crate::config::CatalogConfig;

/// Upper bound on cached products.
const MAX_CACHED_PRODUCTS: u64 = 1000;

/// Longest slice of an error body kept in logs and errors.
const ERROR_BODY_PREVIEW: usize = 200;

/// Client for the catalog and stock service.
///
/// Cheaply cloneable; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<ProductId, Product>,
}

impl ApiClient {
    /// Create a new catalog API client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let products = Cache::builder()
            .max_capacity(MAX_CACHED_PRODUCTS)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                products,
            }),
        })
    }

    /// GET a JSON resource relative to the base URL.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = self.inner.base_url.join(path)?;
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(path.to_string()));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            tracing::error!(
                status = %status,
                path,
                body = %preview,
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: preview,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %body.chars().take(ERROR_BODY_PREVIEW).collect::<String>(),
                "Failed to parse catalog API response"
            );
            CatalogError::Parse(e)
        })
    }

    /// Get product metadata by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self.get_json(&format!("products/{id}")).await?;

        self.inner.products.insert(id, product.clone()).await;

        Ok(product)
    }

    /// Get the current stock entry for a product (never cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_stock(&self, id: ProductId) -> Result<StockEntry, CatalogError> {
        self.get_json(&format!("stock/{id}")).await
    }
}

#[async_trait]
impl ProductCatalog for ApiClient {
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.get_product(id).await
    }
}

#[async_trait]
impl StockOracle for ApiClient {
    async fn stock(&self, id: ProductId) -> Result<StockEntry, CatalogError> {
        self.get_stock(id).await
    }
}
