//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::{CartStore, Collaborators};
use crate::catalog::{ApiClient, CatalogError};
use crate::config::StorefrontConfig;
use crate::notify::ToastQueue;
use crate::storage::{CartStorage, FileStorage};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The cart store inside it is
/// the single cart for the session; it is built once here and handed to
/// handlers explicitly.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    cart: CartStore,
    toasts: Arc<ToastQueue>,
    storage: Arc<dyn CartStorage>,
}

impl AppState {
    /// Create application state with the file-backed storage from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, CatalogError> {
        let storage = Arc::new(FileStorage::new(&config.storage.path));
        Self::with_storage(config, storage)
    }

    /// Create application state on top of an explicit storage area.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog client cannot be built.
    pub fn with_storage(
        config: StorefrontConfig,
        storage: Arc<dyn CartStorage>,
    ) -> Result<Self, CatalogError> {
        let api = Arc::new(ApiClient::new(&config.catalog)?);
        let toasts = Arc::new(ToastQueue::new());

        let cart = CartStore::open(
            Collaborators {
                catalog: api.clone(),
                stock: api,
                storage: storage.clone(),
                notifier: toasts.clone(),
            },
            config.storage.cart_key.clone(),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                cart,
                toasts,
                storage,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the pending toast queue.
    #[must_use]
    pub fn toasts(&self) -> &ToastQueue {
        &self.inner.toasts
    }

    /// Get a reference to the durable storage area.
    #[must_use]
    pub fn storage(&self) -> &dyn CartStorage {
        self.inner.storage.as_ref()
    }
}
