//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ROCKETSHOES_API_URL` - Base URL of the catalog/stock service
//!
//! ## Optional
//! - `ROCKETSHOES_API_TOKEN` - Bearer token for the catalog/stock service
//! - `ROCKETSHOES_CART_FILE` - Local storage file (default: .rocketshoes/storage.json)
//! - `ROCKETSHOES_CART_KEY` - Storage slot holding the cart (default: @RocketShoes:cart)
//! - `ROCKETSHOES_CATALOG_CACHE_SECS` - Product metadata cache TTL (default: 300)
//! - `ROCKETSHOES_CURRENCY` - Display currency (default: BRL)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3333)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use rocketshoes_core::CurrencyCode;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Storage slot the cart lives under.
pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

const DEFAULT_CART_FILE: &str = ".rocketshoes/storage.json";
const DEFAULT_CACHE_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Catalog and stock service configuration
    pub catalog: CatalogConfig,
    /// Durable cart storage configuration
    pub storage: StorageConfig,
    /// Currency used when formatting prices
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Catalog and stock service configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL; products live under `/products/{id}`, stock under `/stock/{id}`
    pub api_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// How long product metadata stays cached
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("api_url", &self.api_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

/// Durable cart storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// File holding the local storage area
    pub path: PathBuf,
    /// Key of the slot holding the serialized cart
    pub cart_key: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3333")?;
        let currency = parse_env("ROCKETSHOES_CURRENCY", "BRL")?;

        Ok(Self {
            host,
            port,
            catalog: CatalogConfig::from_env()?,
            storage: StorageConfig::from_env(),
            currency,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("ROCKETSHOES_API_URL")?;
        let api_url = parse_base_url(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("ROCKETSHOES_API_URL".to_string(), e))?;
        let cache_secs: u64 =
            parse_env("ROCKETSHOES_CATALOG_CACHE_SECS", &DEFAULT_CACHE_SECS.to_string())?;

        Ok(Self {
            api_url,
            api_token: get_optional_env("ROCKETSHOES_API_TOKEN").map(SecretString::from),
            cache_ttl: Duration::from_secs(cache_secs),
        })
    }
}

impl StorageConfig {
    fn from_env() -> Self {
        Self {
            path: PathBuf::from(get_env_or_default("ROCKETSHOES_CART_FILE", DEFAULT_CART_FILE)),
            cart_key: get_env_or_default("ROCKETSHOES_CART_KEY", DEFAULT_CART_KEY),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse the service base URL, ensuring relative joins keep its path.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err("must be an absolute http(s) URL".to_string());
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
