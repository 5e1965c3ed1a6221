//! Cart route handlers.
//!
//! Every mutation answers with the resulting cart. Whether the operation was
//! accepted is only visible through the cart itself and the toast queue.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use rocketshoes_core::{Cart, CurrencyCode, Price, Product, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cart::UpdateProductAmount;
use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

/// Cart line item as rendered by the SPA.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    #[serde(flatten)]
    pub product: Product,
    pub price_formatted: String,
    pub subtotal: String,
}

/// Cart as rendered by the SPA.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    /// Distinct line items, shown in the header badge.
    pub item_count: usize,
    pub total_quantity: u64,
    pub total: String,
}

impl CartView {
    /// Render a cart with prices in `currency`.
    #[must_use]
    pub fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|product| CartItemView {
                    price_formatted: Price::new(product.price, currency).display(),
                    subtotal: Price::new(product.subtotal(), currency).display(),
                    product: product.clone(),
                })
                .collect(),
            item_count: cart.len(),
            total_quantity: cart.total_quantity(),
            total: Price::new(cart.total(), currency).display(),
        }
    }
}

/// Body of add/remove requests.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub product_id: ProductId,
}

/// Badge count response.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: usize,
}

fn render(state: &AppState) -> Json<CartView> {
    Json(CartView::new(&state.cart().cart(), state.config().currency))
}

/// Current cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    render(&state)
}

/// Add one unit of a product.
#[instrument(skip_all)]
pub async fn add(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let Json(request) = payload?;
    let product_id = request.product_id.to_string();
    add_breadcrumb("cart", "Add product", Some(&[("product_id", product_id.as_str())]));

    state.cart().add_product(request.product_id).await;
    Ok(render(&state))
}

/// Remove one unit of a product.
#[instrument(skip_all)]
pub async fn remove(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let Json(request) = payload?;
    let product_id = request.product_id.to_string();
    add_breadcrumb("cart", "Remove product", Some(&[("product_id", product_id.as_str())]));

    state.cart().remove_product(request.product_id);
    Ok(render(&state))
}

/// Set a line item's quantity.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateProductAmount>, JsonRejection>,
) -> Result<Json<CartView>> {
    let Json(request) = payload?;
    let product_id = request.product_id.to_string();
    let amount = request.amount.to_string();
    add_breadcrumb(
        "cart",
        "Update product amount",
        Some(&[("product_id", product_id.as_str()), ("amount", amount.as_str())]),
    );

    state.cart().update_product_amount(request).await;
    Ok(render(&state))
}

/// Distinct line item count for the header badge.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Json<CartCount> {
    Json(CartCount {
        count: state.cart().cart().len(),
    })
}
