//! Integration tests for Shopfront.
//!
//! [`FakeBackend`] is an in-process axum server implementing the storefront
//! REST API (envelope format, bearer tokens, cart endpoints, login, health,
//! products) on an ephemeral port. Tests drive the real `HttpTransport`
//! against it.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Fixtures
//!
//! Every backend starts with:
//! - product 42 "Mug" at $10.00, 10 in stock
//! - product 7 "Tee" at $19.99, 5 in stock
//! - account `shopper@example.com` / `correct horse`
//! - coupon `SAVE10` (10% off)

#![cfg_attr(not(test), forbid(unsafe_code))]

mod routes;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use shopfront_cart::ClientConfig;
use shopfront_core::{Cart, ProductId, ProductSnapshot, UserId};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

pub use store::RecordedRequest;

use routes::Shared;
use store::Store;

pub const SHOPPER_EMAIL: &str = "shopper@example.com";
pub const SHOPPER_PASSWORD: &str = "correct horse";
pub const MUG: ProductId = ProductId::new(42);
pub const TEE: ProductId = ProductId::new(7);

/// Fake storefront backend bound to `127.0.0.1`.
///
/// The server task is aborted when the backend is dropped.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Shared,
    shopper: UserId,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Start a backend with the default fixtures.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let mut store = Store::default();
        store.add_product(snapshot(MUG, "Mug", Decimal::new(1000, 2), 10));
        store.add_product(snapshot(TEE, "Tee", Decimal::new(1999, 2), 5));
        let shopper = store.add_account(SHOPPER_EMAIL, SHOPPER_PASSWORD, "Sam Shopper");
        store.add_coupon("SAVE10", Decimal::TEN);

        let state: Shared = Arc::new(Mutex::new(store));
        let app = routes::router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Listener has no address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            shopper,
            server,
        }
    }

    /// Base URL of the backend.
    ///
    /// # Panics
    ///
    /// Never in practice: the address always forms a valid URL.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("Socket address is a valid URL")
    }

    /// Client configuration pointing at this backend.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.url())
    }

    /// Make `/health` answer 503.
    pub fn set_healthy(&self, healthy: bool) {
        self.state.lock().healthy = healthy;
    }

    /// Forget every issued token, so the next authenticated call gets a 401.
    pub fn revoke_sessions(&self) {
        self.state.lock().revoke_tokens();
    }

    pub fn set_stock(&self, product: ProductId, stock: u32) {
        self.state.lock().set_stock(product, stock);
    }

    /// The shopper's cart as the server holds it.
    #[must_use]
    pub fn shopper_cart(&self) -> Option<Cart> {
        self.state.lock().cart_of(self.shopper)
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// Requests received on paths starting with `prefix`.
    #[must_use]
    pub fn request_count(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.path.starts_with(prefix))
            .count()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn snapshot(id: ProductId, name: &str, price: Decimal, stock: u32) -> ProductSnapshot {
    ProductSnapshot {
        id,
        name: name.to_string(),
        price,
        stock: Some(stock),
        image: Some(format!("/images/{id}.png")),
    }
}
