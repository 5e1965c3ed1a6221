//! Integration tests for the RocketShoes storefront API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! Tests drive the full router in-process with `tower::ServiceExt::oneshot`.
//! The catalog/stock service is a `mockito` server; storage is either in
//! memory or a temporary file.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use mockito::{Mock, ServerGuard};
use rocketshoes_core::CurrencyCode;
use rocketshoes_storefront::config::{CatalogConfig, StorageConfig, StorefrontConfig};
use rocketshoes_storefront::routes;
use rocketshoes_storefront::state::AppState;
use rocketshoes_storefront::storage::CartStorage;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Storage slot used by every test context.
pub const CART_KEY: &str = "@RocketShoes:cart";

/// Largest response body the helpers will read.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// A running app wired to a mock catalog service.
pub struct TestContext {
    pub server: ServerGuard,
    pub state: AppState,
    app: Router,
}

impl TestContext {
    /// Build an app on top of `storage`, talking to a fresh mock server.
    pub async fn new(storage: Arc<dyn CartStorage>) -> Self {
        let server = mockito::Server::new_async().await;
        let state = AppState::with_storage(config_for(&server), storage)
            .expect("Failed to build application state");
        let app = routes::app(state.clone());

        Self { server, state, app }
    }

    /// Rebuild the app over the same storage, as a restarted session would.
    pub async fn restart(self, storage: Arc<dyn CartStorage>) -> Self {
        let state = AppState::with_storage(config_for(&self.server), storage)
            .expect("Failed to build application state");
        let app = routes::app(state.clone());

        Self {
            server: self.server,
            state,
            app,
        }
    }

    /// Serve `GET /products/{id}`.
    pub async fn mock_product(&mut self, id: i32, title: &str, price: f64) -> Mock {
        self.server
            .mock("GET", format!("/products/{id}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": id,
                    "title": title,
                    "price": price,
                    "image": format!("https://cdn.example.com/{id}.jpg")
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    /// Serve `GET /stock/{id}`.
    pub async fn mock_stock(&mut self, id: i32, amount: u32) -> Mock {
        self.server
            .mock("GET", format!("/stock/{id}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "id": id, "amount": amount }).to_string())
            .create_async()
            .await
    }

    /// Send a GET request and decode the JSON body (`Null` if not JSON).
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::get(path)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Send a JSON POST request and decode the JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        self.post_raw(path, body.to_string()).await
    }

    /// Send a POST request with an arbitrary JSON-typed body.
    pub async fn post_raw(&self, path: &str, body: String) -> (StatusCode, Value) {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Drain toasts and return their messages.
    pub async fn toasts(&self) -> Vec<String> {
        let (_, body) = self.get("/notifications").await;
        body.as_array()
            .map(|toasts| {
                toasts
                    .iter()
                    .filter_map(|toast| toast["message"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("Failed to read response body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}

/// Find the quantity of a product in a rendered cart.
#[must_use]
pub fn amount_of(cart: &Value, id: i64) -> Option<u64> {
    cart["items"]
        .as_array()?
        .iter()
        .find(|item| item["id"].as_i64() == Some(id))
        .and_then(|item| item["amount"].as_u64())
}

fn config_for(server: &ServerGuard) -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().expect("valid IP"),
        port: 0,
        catalog: CatalogConfig {
            api_url: url::Url::parse(&format!("{}/", server.url())).expect("valid mock URL"),
            api_token: None,
            cache_ttl: Duration::from_secs(300),
        },
        storage: StorageConfig {
            path: "unused.json".into(),
            cart_key: CART_KEY.to_string(),
        },
        currency: CurrencyCode::BRL,
        sentry_dsn: None,
        sentry_environment: None,
    }
}
