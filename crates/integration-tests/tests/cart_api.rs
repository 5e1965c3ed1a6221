//! End-to-end tests of the cart API.
//!
//! Run with: cargo test -p rocketshoes-integration-tests

use std::sync::Arc;

use axum::http::StatusCode;
use rocketshoes_core::{Cart, ProductId};
use rocketshoes_integration_tests::{CART_KEY, TestContext, amount_of};
use rocketshoes_storefront::storage::{CartStorage, FileStorage, MemoryStorage};
use serde_json::json;

const OUT_OF_STOCK: &str = "Quantidade solicitada fora de estoque";
const ADD_FAILED: &str = "Erro na adição do produto";
const REMOVE_FAILED: &str = "Erro na remoção do produto";
const UPDATE_FAILED: &str = "Erro na alteração de quantidade do produto";

fn stored_line(id: i32, amount: u32) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Shoe {id}"),
        "price": 139.9,
        "image": "",
        "amount": amount
    })
}

fn storage_with(lines: &serde_json::Value) -> Arc<MemoryStorage> {
    Arc::new(MemoryStorage::with_item(CART_KEY, &lines.to_string()))
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let ctx = TestContext::new(Arc::new(MemoryStorage::new())).await;

    let (status, _) = ctx.get("/health").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let ctx = TestContext::new(Arc::new(MemoryStorage::new())).await;

    let (status, body) = ctx.get("/checkout").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found: /checkout");
}

// ============================================================================
// Add
// ============================================================================

#[tokio::test]
async fn test_add_new_product_to_empty_cart() {
    let mut ctx = TestContext::new(Arc::new(MemoryStorage::new())).await;
    ctx.mock_product(5, "Shoe", 179.9).await;
    ctx.mock_stock(5, 10).await;

    let (status, cart) = ctx.post("/cart/add", &json!({"product_id": 5})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 1);
    assert_eq!(cart["items"][0]["title"], "Shoe");
    assert_eq!(amount_of(&cart, 5), Some(1));
    assert_eq!(cart["total"], "R$ 179.90");
    assert!(ctx.toasts().await.is_empty());
}

#[tokio::test]
async fn test_add_at_stock_limit_is_rejected() {
    let mut ctx = TestContext::new(storage_with(&json!([stored_line(1, 2)]))).await;
    ctx.mock_stock(1, 2).await;

    let (status, cart) = ctx.post("/cart/add", &json!({"product_id": 1})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount_of(&cart, 1), Some(2));
    assert_eq!(ctx.toasts().await, vec![OUT_OF_STOCK]);
}

#[tokio::test]
async fn test_add_increments_existing_product() {
    let mut ctx = TestContext::new(storage_with(&json!([stored_line(1, 2)]))).await;
    ctx.mock_stock(1, 3).await;

    let (_, cart) = ctx.post("/cart/add", &json!({"product_id": 1})).await;

    assert_eq!(amount_of(&cart, 1), Some(3));
}

#[tokio::test]
async fn test_add_with_catalog_outage_reports_failure() {
    let mut ctx = TestContext::new(Arc::new(MemoryStorage::new())).await;
    ctx.server
        .mock("GET", "/products/9")
        .with_status(503)
        .create_async()
        .await;

    let (status, cart) = ctx.post("/cart/add", &json!({"product_id": 9})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 0);
    assert_eq!(ctx.toasts().await, vec![ADD_FAILED]);
}

// ============================================================================
// Remove
// ============================================================================

#[tokio::test]
async fn test_remove_decrements() {
    let ctx = TestContext::new(storage_with(&json!([stored_line(2, 3)]))).await;

    let (_, cart) = ctx.post("/cart/remove", &json!({"product_id": 2})).await;

    assert_eq!(amount_of(&cart, 2), Some(2));
}

#[tokio::test]
async fn test_remove_absent_product_reports_failure() {
    let ctx = TestContext::new(storage_with(&json!([stored_line(2, 3)]))).await;

    let (_, cart) = ctx.post("/cart/remove", &json!({"product_id": 4})).await;

    assert_eq!(amount_of(&cart, 2), Some(3));
    assert_eq!(ctx.toasts().await, vec![REMOVE_FAILED]);
}

#[tokio::test]
async fn test_remove_last_unit_empties_cart() {
    let ctx = TestContext::new(storage_with(&json!([stored_line(2, 1)]))).await;

    let (_, cart) = ctx.post("/cart/remove", &json!({"product_id": 2})).await;
    assert_eq!(cart["item_count"], 0);

    let (_, count) = ctx.get("/cart/count").await;
    assert_eq!(count["count"], 0);
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_sets_absolute_amount() {
    let mut ctx = TestContext::new(storage_with(&json!([stored_line(1, 1)]))).await;
    ctx.mock_stock(1, 8).await;

    let (_, cart) = ctx
        .post("/cart/update", &json!({"product_id": 1, "amount": 8}))
        .await;

    assert_eq!(amount_of(&cart, 1), Some(8));
}

#[tokio::test]
async fn test_update_beyond_stock_is_rejected() {
    let mut ctx = TestContext::new(storage_with(&json!([stored_line(1, 1)]))).await;
    ctx.mock_stock(1, 8).await;

    let (_, cart) = ctx
        .post("/cart/update", &json!({"product_id": 1, "amount": 9}))
        .await;

    assert_eq!(amount_of(&cart, 1), Some(1));
    assert_eq!(ctx.toasts().await, vec![OUT_OF_STOCK]);
}

#[tokio::test]
async fn test_update_non_positive_amount_is_silent() {
    // No stock mock: a lookup would fail and queue a toast.
    let ctx = TestContext::new(storage_with(&json!([stored_line(1, 4)]))).await;

    for amount in [0, -3] {
        let (status, cart) = ctx
            .post("/cart/update", &json!({"product_id": 1, "amount": amount}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(amount_of(&cart, 1), Some(4));
    }

    assert!(ctx.toasts().await.is_empty());
}

#[tokio::test]
async fn test_update_absent_product_reports_failure() {
    let ctx = TestContext::new(Arc::new(MemoryStorage::new())).await;

    ctx.post("/cart/update", &json!({"product_id": 1, "amount": 2}))
        .await;

    assert_eq!(ctx.toasts().await, vec![UPDATE_FAILED]);
}

// ============================================================================
// Requests
// ============================================================================

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let ctx = TestContext::new(Arc::new(MemoryStorage::new())).await;

    let (status, body) = ctx.post_raw("/cart/add", "{not json".to_string()).await;
    assert!(status.is_client_error());
    assert!(body["error"].is_string());

    let (status, _) = ctx
        .post("/cart/update", &json!({"product_id": "five", "amount": 1}))
        .await;
    assert!(status.is_client_error());
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_cart_survives_restart_with_file_storage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("storage.json");

    let mut ctx = TestContext::new(Arc::new(FileStorage::new(&path))).await;
    ctx.mock_product(5, "Shoe", 179.9).await;
    ctx.mock_stock(5, 10).await;
    ctx.mock_product(6, "Boot", 250.0).await;
    ctx.mock_stock(6, 1).await;

    ctx.post("/cart/add", &json!({"product_id": 5})).await;
    ctx.post("/cart/add", &json!({"product_id": 5})).await;
    ctx.post("/cart/add", &json!({"product_id": 6})).await;
    let (_, before) = ctx.get("/cart").await;

    let storage = Arc::new(FileStorage::new(&path));
    let raw = storage
        .get_item(CART_KEY)
        .expect("readable storage")
        .expect("cart slot written");
    let stored = Cart::decode(&raw).expect("valid stored cart");
    assert_eq!(stored.find(ProductId::new(5)).map(|p| p.amount), Some(2));
    assert_eq!(stored.find(ProductId::new(6)).map(|p| p.amount), Some(1));

    let ctx = ctx.restart(storage).await;
    let (_, after) = ctx.get("/cart").await;

    assert_eq!(amount_of(&after, 5), Some(2));
    assert_eq!(amount_of(&after, 6), Some(1));
    assert_eq!(after["total"], before["total"]);
}

#[tokio::test]
async fn test_invalid_stored_cart_starts_empty() {
    let storage = Arc::new(MemoryStorage::with_item(CART_KEY, "{\"broken\":true}"));
    let ctx = TestContext::new(storage).await;

    let (_, cart) = ctx.get("/cart").await;

    assert_eq!(cart["item_count"], 0);
    assert!(ctx.toasts().await.is_empty());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let ctx = TestContext::new(Arc::new(MemoryStorage::new())).await;
    let request = axum::http::Request::get("/health")
        .header("x-request-id", "req-123")
        .body(axum::body::Body::empty())
        .expect("request");

    let response = tower::ServiceExt::oneshot(
        rocketshoes_storefront::routes::app(ctx.state.clone()),
        request,
    )
    .await
    .expect("response");

    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-123")
    );
}
