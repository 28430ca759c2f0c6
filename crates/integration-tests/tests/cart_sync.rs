//! End-to-end cart synchronization against the fake backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use shopfront_cart::{
    AuthService, CartClient, CartPhase, CheckoutBlocker, ClientError, HttpTransport, NoticeLevel,
    RecordingNotifier, SessionStore,
};
use shopfront_integration_tests::{FakeBackend, MUG, SHOPPER_EMAIL, SHOPPER_PASSWORD, TEE};

struct Shopper {
    backend: FakeBackend,
    auth: AuthService,
    cart: CartClient,
    notices: Arc<RecordingNotifier>,
}

async fn shopper(sign_in: bool) -> Shopper {
    let backend = FakeBackend::start().await;
    let config = backend.config();
    let store = SessionStore::new();

    let auth = AuthService::from_config(&config, store.clone()).unwrap();
    if sign_in {
        auth.login(
            SHOPPER_EMAIL,
            &SecretString::from(SHOPPER_PASSWORD.to_string()),
        )
        .await
        .unwrap();
    }

    let notices = Arc::new(RecordingNotifier::default());
    let transport = HttpTransport::new(&config, store.clone()).unwrap();
    let cart = CartClient::builder(Arc::new(transport), store)
        .notifier(notices.clone())
        .build();
    cart.init().await;

    Shopper {
        backend,
        auth,
        cart,
        notices,
    }
}

async fn wait_for(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn test_add_update_remove_scenario() {
    let s = shopper(true).await;
    assert_eq!(s.cart.phase(), CartPhase::Empty);
    assert_eq!(s.cart.item_count(), 0);

    s.cart.add_item(MUG, 2).await.unwrap();
    let item = s.cart.cart_item(MUG).unwrap();
    assert_eq!(item.quantity, 2);
    assert_eq!(s.cart.cart_total(), Decimal::new(2000, 2));

    s.cart.update_quantity(item.id, 5).await.unwrap();
    assert_eq!(s.cart.cart_total(), Decimal::new(5000, 2));
    assert_eq!(s.cart.item_count(), 5);

    s.cart.remove_item(item.id).await.unwrap();
    assert_eq!(s.cart.item_count(), 0);
    assert_eq!(s.cart.phase(), CartPhase::Empty);
    assert!(s.backend.shopper_cart().unwrap().items.is_empty());
}

#[tokio::test]
async fn test_mirror_matches_server_after_each_operation() {
    let s = shopper(true).await;

    s.cart.add_item(MUG, 1).await.unwrap();
    s.cart.add_item(TEE, 2).await.unwrap();
    s.cart.add_item(MUG, 1).await.unwrap();

    let server = s.backend.shopper_cart().unwrap();
    assert_eq!(s.cart.snapshot(), Some(server.clone()));
    assert_eq!(s.cart.item_count(), 4);
    assert_eq!(s.cart.cart_total(), Decimal::new(5998, 2));
    assert_eq!(Some(s.cart.cart_total()), server.total);
}

#[tokio::test]
async fn test_update_to_zero_removes_line() {
    let s = shopper(true).await;
    let cart = s.cart.add_item(TEE, 1).await.unwrap();
    let item_id = cart.items[0].id;

    s.cart.update_quantity(item_id, 0).await.unwrap();

    assert!(!s.cart.is_in_cart(TEE));
    let deletes = s
        .backend
        .requests()
        .into_iter()
        .filter(|r| r.method == "DELETE" && r.path == format!("/cart/items/{item_id}"))
        .count();
    assert_eq!(deletes, 1);
}

#[tokio::test]
async fn test_clear_cart() {
    let s = shopper(true).await;
    s.cart.add_item(MUG, 3).await.unwrap();

    s.cart.clear_cart().await.unwrap();

    assert_eq!(s.cart.item_count(), 0);
    assert_eq!(s.cart.cart_total(), Decimal::ZERO);
    assert!(s.backend.shopper_cart().unwrap().items.is_empty());
}

#[tokio::test]
async fn test_refresh_reloads_existing_cart() {
    let s = shopper(true).await;
    s.cart.add_item(MUG, 2).await.unwrap();

    let other = shopper_client_for(&s).await;
    assert_eq!(other.item_count(), 2);
    assert_eq!(other.refresh().await.unwrap(), s.backend.shopper_cart());
}

async fn shopper_client_for(s: &Shopper) -> CartClient {
    let config = s.backend.config();
    let client = CartClient::from_config(&config, s.auth.store().clone()).unwrap();
    client.load_cart().await;
    client
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_unauthenticated_mutations_never_reach_backend() {
    let s = shopper(false).await;

    let err = s.cart.add_item(MUG, 1).await.unwrap_err();

    assert!(matches!(err, ClientError::AuthRequired));
    assert_eq!(s.backend.request_count("/cart"), 0);
}

#[tokio::test]
async fn test_revoked_session_forces_logout() {
    let s = shopper(true).await;
    s.cart.add_item(MUG, 1).await.unwrap();

    s.backend.revoke_sessions();
    let err = s.cart.add_item(MUG, 1).await.unwrap_err();

    assert!(matches!(err, ClientError::AuthRequired));
    assert!(s.auth.store().state().requires_login());
    wait_for(|| s.cart.snapshot().is_none()).await;
    assert_eq!(s.cart.phase(), CartPhase::Empty);
}

#[tokio::test]
async fn test_stock_rejection_keeps_mirror() {
    let s = shopper(true).await;
    s.cart.add_item(MUG, 2).await.unwrap();
    let before = s.cart.snapshot();
    s.notices.take();

    let err = s.cart.add_item(MUG, 20).await.unwrap_err();

    match err {
        ClientError::ServerRejected { status, message } => {
            assert_eq!(status, Some(422));
            assert_eq!(message, "Only 10 left in stock");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(s.cart.snapshot(), before);

    let notices = s.notices.take();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_unsuccessful_envelope_on_http_200() {
    let s = shopper(true).await;
    s.cart.add_item(MUG, 2).await.unwrap();

    let err = s.cart.apply_coupon("BOGUS").await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::ServerRejected { status: Some(200), ref message } if message == "Invalid coupon code"
    ));
    assert!(s.cart.coupon_code().is_none());
}

// =============================================================================
// Coupons and checkout
// =============================================================================

#[tokio::test]
async fn test_coupon_discount() {
    let s = shopper(true).await;
    s.cart.add_item(MUG, 2).await.unwrap();

    s.cart.apply_coupon("SAVE10").await.unwrap();
    assert_eq!(s.cart.coupon_code().as_deref(), Some("SAVE10"));
    assert_eq!(s.cart.cart_total(), Decimal::new(2000, 2));
    assert_eq!(s.cart.payable_total(), Decimal::new(1800, 2));

    s.cart.remove_coupon().await.unwrap();
    assert!(s.cart.coupon_code().is_none());
    assert_eq!(s.cart.payable_total(), Decimal::new(2000, 2));
}

#[tokio::test]
async fn test_validate_empty_cart_is_blocked_locally() {
    let s = shopper(true).await;

    let err = s.cart.validate_cart().await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::CheckoutBlocked(CheckoutBlocker::EmptyCart)
    ));
    assert_eq!(s.backend.request_count("/cart/validate"), 0);
}

#[tokio::test]
async fn test_validate_reports_stock_issues() {
    let s = shopper(true).await;
    s.cart.add_item(MUG, 5).await.unwrap();

    assert!(s.cart.validate_cart().await.unwrap().valid);

    s.backend.set_stock(MUG, 3);
    let verdict = s.cart.validate_cart().await.unwrap();
    assert!(!verdict.valid);
    assert_eq!(verdict.issues, vec!["Only 3 of Mug left in stock"]);
}

// =============================================================================
// Session lifecycle and transport
// =============================================================================

#[tokio::test]
async fn test_sign_in_and_out_follow_session() {
    let s = shopper(false).await;
    assert_eq!(s.cart.phase(), CartPhase::Empty);

    s.auth
        .login(
            SHOPPER_EMAIL,
            &SecretString::from(SHOPPER_PASSWORD.to_string()),
        )
        .await
        .unwrap();
    s.cart.add_item(TEE, 1).await.unwrap();

    s.auth.logout();
    wait_for(|| s.cart.snapshot().is_none()).await;
    assert_eq!(s.cart.item_count(), 0);

    s.cart.dispose();
    assert_eq!(s.cart.phase(), CartPhase::Uninitialized);
}

#[tokio::test]
async fn test_requests_carry_ids_and_tokens() {
    let s = shopper(true).await;
    s.cart.add_item(MUG, 1).await.unwrap();

    let requests = s.backend.requests();
    let login = requests.iter().find(|r| r.path == "/auth/login").unwrap();
    assert!(!login.bearer);

    let add = requests.iter().find(|r| r.path == "/cart/add").unwrap();
    assert!(add.bearer);

    let mut ids: Vec<_> = requests
        .iter()
        .map(|r| r.request_id.clone().unwrap())
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), requests.len());
}
