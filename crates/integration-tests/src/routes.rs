//! Axum handlers speaking the storefront envelope protocol.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shopfront_cart::transport::Envelope;
use shopfront_core::{CartItemId, ProductId, UserId};

use crate::store::{RecordedRequest, Rejection, Store};

pub type Shared = Arc<Mutex<Store>>;

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(Envelope::<()>::fail(self.message)),
        )
            .into_response()
    }
}

fn respond<T: Serialize>(result: Result<T, Rejection>) -> Response {
    match result {
        Ok(data) => Json(Envelope::ok(data)).into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn authorize(store: &Store, headers: &HeaderMap) -> Result<UserId, Rejection> {
    bearer(headers)
        .and_then(|token| store.user_for_token(token))
        .ok_or_else(|| Rejection::new(StatusCode::UNAUTHORIZED, "Invalid or expired token"))
}

pub fn router(state: Shared) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/products/{id}", get(product))
        .route("/cart", get(show_cart))
        .route("/cart/add", post(add))
        .route("/cart/items/{id}", put(update).delete(remove))
        .route("/cart/clear", delete(clear))
        .route("/cart/apply-coupon", post(apply_coupon))
        .route("/cart/remove-coupon", delete(remove_coupon))
        .route("/cart/validate", post(validate))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        request_id: request
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        bearer: bearer(request.headers()).is_some(),
    };
    state.lock().requests.push(recorded);
    next.run(request).await
}

// =============================================================================
// Health and auth
// =============================================================================

async fn health(State(state): State<Shared>) -> Response {
    if state.lock().healthy {
        respond(Ok(json!({ "status": "ok" })))
    } else {
        Rejection::new(StatusCode::SERVICE_UNAVAILABLE, "Maintenance").into_response()
    }
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginRequest>) -> Response {
    respond(state.lock().login(&body.email, &body.password))
}

async fn product(State(state): State<Shared>, Path(id): Path<i32>) -> Response {
    respond(state.lock().product(ProductId::new(id)))
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddRequest {
    product_id: ProductId,
    quantity: u32,
}

#[derive(Deserialize)]
struct UpdateRequest {
    quantity: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CouponRequest {
    coupon_code: String,
}

async fn show_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let store = state.lock();
    respond(authorize(&store, &headers).and_then(|user| store.cart(user)))
}

async fn add(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddRequest>,
) -> Response {
    let mut store = state.lock();
    respond(
        authorize(&store, &headers).and_then(|user| store.add(user, body.product_id, body.quantity)),
    )
}

async fn update(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(body): Json<UpdateRequest>,
) -> Response {
    let mut store = state.lock();
    respond(
        authorize(&store, &headers)
            .and_then(|user| store.set_quantity(user, CartItemId::new(id), body.quantity)),
    )
}

async fn remove(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i32>) -> Response {
    let mut store = state.lock();
    respond(authorize(&store, &headers).and_then(|user| store.remove(user, CartItemId::new(id))))
}

async fn clear(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut store = state.lock();
    match authorize(&store, &headers).and_then(|user| store.clear(user)) {
        Ok(()) => Json(Envelope::<()>::empty()).into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

async fn apply_coupon(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CouponRequest>,
) -> Response {
    let mut store = state.lock();
    respond(authorize(&store, &headers).and_then(|user| store.apply_coupon(user, &body.coupon_code)))
}

async fn remove_coupon(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut store = state.lock();
    respond(authorize(&store, &headers).and_then(|user| store.remove_coupon(user)))
}

async fn validate(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let store = state.lock();
    respond(authorize(&store, &headers).and_then(|user| store.validate(user)))
}
