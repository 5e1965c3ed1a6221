//! The cart store.
//!
//! [`CartStore`] owns the committed cart for the session. Every operation
//! reads a snapshot, checks stock where needed, then replaces the whole cart
//! in one commit that publishes to subscribers and rewrites the storage slot.
//!
//! Operations never fail toward the caller. Failures are logged and turned
//! into a toast through the [`Notifier`], so the only observable effects are
//! the notification and the (unchanged) cart.
//!
//! Two overlapping operations read the same snapshot; the last one to commit
//! wins.

pub mod messages;

use std::sync::Arc;

use rocketshoes_core::{Cart, Product, ProductId};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::catalog::{CatalogError, ProductCatalog, StockOracle};
use crate::notify::{Notification, Notifier};
use crate::storage::CartStorage;

/// Reasons a cart operation is rejected.
#[derive(Debug, Error)]
pub enum CartError {
    /// The requested quantity exceeds available stock.
    #[error("requested {requested} of product {product_id}, only {available} in stock")]
    OutOfStock {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },

    /// The product has no line item in the cart.
    #[error("product {0} is not in the cart")]
    ItemNotFound(ProductId),

    /// Product or stock lookup failed.
    #[error("lookup failed: {0}")]
    Lookup(#[from] CatalogError),
}

/// Request to set a line item's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// Absolute target quantity. Values `<= 0` are ignored.
    pub amount: i64,
}

/// External services the cart store depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub catalog: Arc<dyn ProductCatalog>,
    pub stock: Arc<dyn StockOracle>,
    pub storage: Arc<dyn CartStorage>,
    pub notifier: Arc<dyn Notifier>,
}

/// Authoritative cart state for the session.
pub struct CartStore {
    state: watch::Sender<Cart>,
    storage_key: String,
    catalog: Arc<dyn ProductCatalog>,
    stock: Arc<dyn StockOracle>,
    storage: Arc<dyn CartStorage>,
    notifier: Arc<dyn Notifier>,
}

impl CartStore {
    /// Open the store, restoring the cart from the `storage_key` slot.
    ///
    /// Missing, unreadable or invalid content yields an empty cart.
    pub fn open(collaborators: Collaborators, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let cart = restore(collaborators.storage.as_ref(), &storage_key);
        let (state, _) = watch::channel(cart);

        Self {
            state,
            storage_key,
            catalog: collaborators.catalog,
            stock: collaborators.stock,
            storage: collaborators.storage,
            notifier: collaborators.notifier,
        }
    }

    /// Snapshot of the committed cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.state.borrow().clone()
    }

    /// Observe every committed cart.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.state.subscribe()
    }

    /// Add one unit of a product, fetching its metadata if it is new to the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) {
        if let Err(err) = self.try_add_product(product_id).await {
            self.report(&err, messages::ADD_FAILED);
        }
    }

    /// Remove one unit of a product. The line item goes away at zero.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_product(&self, product_id: ProductId) {
        if let Err(err) = self.try_remove_product(product_id) {
            self.report(&err, messages::REMOVE_FAILED);
        }
    }

    /// Set a line item's quantity to an absolute value.
    #[instrument(skip(self), fields(product_id = %update.product_id, amount = update.amount))]
    pub async fn update_product_amount(&self, update: UpdateProductAmount) {
        if update.amount <= 0 {
            debug!("Ignoring non-positive amount");
            return;
        }
        if let Err(err) = self.try_update_product_amount(update).await {
            self.report(&err, messages::UPDATE_FAILED);
        }
    }

    async fn try_add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let snapshot = self.cart();

        let item = match snapshot.find(product_id) {
            Some(item) => item.clone(),
            None => self.catalog.product(product_id).await?.with_amount(0),
        };

        let stock = self.stock.stock(product_id).await?;
        let requested = item.amount.saturating_add(1);
        if !stock.covers(requested) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: u64::from(requested),
                available: stock.amount,
            });
        }

        self.commit(snapshot.with_item(Product {
            id: product_id,
            ..item.with_amount(requested)
        }));
        Ok(())
    }

    fn try_remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let snapshot = self.cart();
        let item = snapshot
            .find(product_id)
            .ok_or(CartError::ItemNotFound(product_id))?;

        self.commit(snapshot.with_item(item.with_amount(item.amount.saturating_sub(1))));
        Ok(())
    }

    async fn try_update_product_amount(
        &self,
        update: UpdateProductAmount,
    ) -> Result<(), CartError> {
        let snapshot = self.cart();
        let item = snapshot
            .find(update.product_id)
            .ok_or(CartError::ItemNotFound(update.product_id))?;

        let stock = self.stock.stock(update.product_id).await?;
        let requested = update.amount.unsigned_abs();
        if u64::from(stock.amount) < requested {
            return Err(CartError::OutOfStock {
                product_id: update.product_id,
                requested,
                available: stock.amount,
            });
        }

        // Fits in u32: bounded by the stock amount above.
        let amount = u32::try_from(requested).unwrap_or(stock.amount);
        self.commit(snapshot.with_item(item.with_amount(amount)));
        Ok(())
    }

    /// Replace the committed cart and mirror it to storage.
    ///
    /// Persisting inside `send_modify` keeps storage in the same order as
    /// published states when commits race. The storage write is synchronous
    /// and runs on the calling worker thread; it is a single small file.
    fn commit(&self, cart: Cart) {
        self.state.send_modify(|current| {
            self.persist(&cart);
            *current = cart;
        });
    }

    fn persist(&self, cart: &Cart) {
        let result = cart
            .encode()
            .map_err(crate::storage::StorageError::from)
            .and_then(|raw| self.storage.set_item(&self.storage_key, &raw));

        if let Err(e) = result {
            warn!(
                key = %self.storage_key,
                error = %e,
                "Failed to persist cart"
            );
        }
    }

    fn report(&self, err: &CartError, fallback: &str) {
        let message = match err {
            CartError::OutOfStock { .. } => messages::OUT_OF_STOCK,
            CartError::ItemNotFound(_) | CartError::Lookup(_) => fallback,
        };

        warn!(error = %err, "Cart operation rejected");
        self.notifier.notify(Notification::error(message));
    }
}

/// Read and validate the stored cart, falling back to an empty one.
fn restore(storage: &dyn CartStorage, key: &str) -> Cart {
    match storage.get_item(key) {
        Ok(Some(raw)) => Cart::decode(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "Discarding invalid stored cart");
            Cart::empty()
        }),
        Ok(None) => Cart::empty(),
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored cart");
            Cart::empty()
        }
    }
}
