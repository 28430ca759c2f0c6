//! Scripted in-memory transport for unit tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::Value;
use shopfront_core::{Cart, CartId, CartItem, CartItemId, ProductId, ProductSnapshot};

use crate::error::{ClientError, Result};
use crate::session::{Session, SessionStore};
use crate::transport::{ApiRequest, Transport};

struct Scripted {
    delay: Option<Duration>,
    result: Result<Option<Value>>,
}

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct FakeTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn respond(&self, result: Result<Option<Value>>) {
        self.script.lock().push_back(Scripted {
            delay: None,
            result,
        });
    }

    pub fn respond_after(&self, delay: Duration, result: Result<Option<Value>>) {
        self.script.lock().push_back(Scripted {
            delay: Some(delay),
            result,
        });
    }

    pub fn respond_cart(&self, cart: &Cart) {
        self.respond(Ok(Some(cart_value(cart))));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>> {
        self.requests.lock().push(request);
        let next = self.script.lock().pop_front();
        let Some(scripted) = next else {
            return Err(ClientError::NetworkFailure(
                "no scripted response".to_string(),
            ));
        };
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        scripted.result
    }
}

pub fn cart_value(cart: &Cart) -> Value {
    serde_json::to_value(cart).unwrap_or_default()
}

pub fn signed_in() -> SessionStore {
    SessionStore::with_session(Session::new("test-token".to_string().into()))
}

pub fn product(id: i32, price: Decimal) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price,
        stock: Some(100),
        image: None,
    }
}

/// Cart with one line per `(item_id, product_id, unit_price, quantity)`.
pub fn cart(lines: &[(i32, i32, Decimal, u32)]) -> Cart {
    Cart {
        id: Some(CartId::new(1)),
        items: lines
            .iter()
            .map(|&(item_id, product_id, price, quantity)| CartItem {
                id: CartItemId::new(item_id),
                product: product(product_id, price),
                quantity,
                price,
            })
            .collect(),
        ..Cart::default()
    }
}
