//! Cart synchronization client.
//!
//! [`CartClient`] is the single owner of the cart mirror. Every mutating
//! operation is one request; on success the server's cart replaces the
//! mirror wholesale, on failure the mirror is left untouched (or discarded,
//! if the failure means the session is gone). Readers fold over the mirror
//! and never touch the network.
//!
//! Concurrent mutations are not serialized: whichever response arrives last
//! overwrites the mirror. A response that lands after the session ended is
//! returned to its caller but not applied, so a signed-out client never
//! reads as `Ready`.
//!
//! Carts whose totals do not fit a `Decimal` are refused as
//! `MalformedResponse`; the mirror only ever holds carts the readers can
//! fold.
//!
//! # Example
//!
//! ```rust,ignore
//! let client = CartClient::from_config(&config, session.clone())?;
//! client.init().await;
//!
//! let cart = client.add_item(ProductId::new(42), 2).await?;
//! assert_eq!(client.item_count(), 2);
//!
//! client.dispose();
//! ```

mod mirror;
mod routes;

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use shopfront_core::{Cart, CartItem, CartItemId, ProductId};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{CheckoutBlocker, ClientError, Result};
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::session::{AuthState, SessionStore};
use crate::transport::{ApiRequest, HttpTransport, Transport, decode_data};

pub use mirror::CartPhase;
pub use routes::CartRoutes;

use mirror::{CartMirror, InFlight};

/// Server verdict on whether the cart can proceed to checkout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartValidation {
    pub valid: bool,
    #[serde(default)]
    pub issues: Vec<String>,
}

// =============================================================================
// CartClient
// =============================================================================

/// Client-side cart mirror synchronized with the remote cart API.
#[derive(Clone)]
pub struct CartClient {
    inner: Arc<CartClientInner>,
}

struct CartClientInner {
    transport: Arc<dyn Transport>,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
    routes: CartRoutes,
    mirror: RwLock<CartMirror>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for CartClientInner {
    fn drop(&mut self) {
        if let Some(handle) = self.watcher.get_mut().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for CartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartClient")
            .field("routes", &self.inner.routes)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

/// Builder for [`CartClient`].
pub struct CartClientBuilder {
    transport: Arc<dyn Transport>,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
    routes: CartRoutes,
}

impl CartClientBuilder {
    /// Where success and failure notices go.
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Cart endpoint paths.
    #[must_use]
    pub fn routes(mut self, routes: CartRoutes) -> Self {
        self.routes = routes;
        self
    }

    #[must_use]
    pub fn build(self) -> CartClient {
        CartClient {
            inner: Arc::new(CartClientInner {
                transport: self.transport,
                session: self.session,
                notifier: self.notifier,
                routes: self.routes,
                mirror: RwLock::new(CartMirror::default()),
                watcher: Mutex::new(None),
            }),
        }
    }
}

impl CartClient {
    /// Start building a client over `transport`.
    pub fn builder(transport: Arc<dyn Transport>, session: SessionStore) -> CartClientBuilder {
        CartClientBuilder {
            transport,
            session,
            notifier: Arc::new(TracingNotifier),
            routes: CartRoutes::default(),
        }
    }

    /// Client over an [`HttpTransport`] built from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig, session: SessionStore) -> Result<Self> {
        let transport = HttpTransport::new(config, session.clone())?;
        Ok(Self::builder(Arc::new(transport), session)
            .routes(CartRoutes::new(config.cart_prefix.clone()))
            .build())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Follow the session and perform the initial load.
    ///
    /// After `init`, signing in reloads the cart and signing out (or a
    /// server-forced logout) discards the mirror. Calling `init` again
    /// replaces the previous subscription.
    pub async fn init(&self) {
        let mut rx = self.inner.session.subscribe();
        let weak: Weak<CartClientInner> = Arc::downgrade(&self.inner);

        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let client = Self { inner };
                match state {
                    AuthState::SignedIn(_) => client.load_cart().await,
                    AuthState::SignedOut | AuthState::Expired => {
                        client.discard("session ended");
                    }
                }
            }
        });

        if let Some(previous) = self.inner.watcher.lock().replace(handle) {
            previous.abort();
        }

        self.load_cart().await;
    }

    /// Stop following the session and drop the mirror.
    pub fn dispose(&self) {
        if let Some(handle) = self.inner.watcher.lock().take() {
            handle.abort();
        }
        self.inner.mirror.write().reset();
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Fetch the current cart, treating every failure as "no cart yet".
    #[instrument(skip(self))]
    pub async fn load_cart(&self) {
        if !self.inner.session.is_authenticated() {
            self.inner.mirror.write().discard();
            return;
        }

        match self.fetch().await {
            Ok(cart) => self.finish_load(cart),
            Err(e) => {
                debug!(error = %e, "No cart loaded");
                self.finish_load(None);
            }
        }
    }

    /// Fetch the current cart and surface failures.
    ///
    /// # Errors
    ///
    /// `AuthRequired` without a session; transport errors otherwise.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Option<Cart>> {
        let result: Result<Option<Cart>> = async {
            self.require_session()?;
            self.fetch().await
        }
        .await;

        match result {
            Ok(cart) => {
                self.finish_load(cart.clone());
                Ok(cart)
            }
            Err(e) => {
                self.inner.mirror.write().abort_load();
                Err(self.report_failure(e))
            }
        }
    }

    async fn fetch(&self) -> Result<Option<Cart>> {
        self.inner.mirror.write().begin_load();
        let data = self
            .inner
            .transport
            .send(ApiRequest::get(self.inner.routes.cart()))
            .await?;
        match data {
            None | Some(serde_json::Value::Null) => Ok(None),
            data => decode_data(data, "cart").and_then(checked).map(Some),
        }
    }

    fn finish_load(&self, cart: Option<Cart>) {
        let dropped = self.inner.mirror.write().finish_load(cart);
        warn_dropped(dropped);
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of a product.
    ///
    /// # Errors
    ///
    /// `AuthRequired` without a session, `InvalidArgument` for a zero
    /// quantity, transport errors otherwise.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_item(&self, product_id: ProductId, quantity: u32) -> Result<Cart> {
        let result: Result<Cart> = async {
            self.require_session()?;
            if quantity == 0 {
                return Err(ClientError::InvalidArgument(
                    "quantity must be at least 1".to_string(),
                ));
            }
            let request = ApiRequest::post(self.inner.routes.add())
                .json(json!({ "productId": product_id, "quantity": quantity }));
            self.sync(request).await
        }
        .await;

        self.report(result, "Added to cart")
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// `AuthRequired` without a session, `InvalidArgument` for a negative
    /// quantity, transport errors otherwise.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn update_quantity(&self, item_id: CartItemId, quantity: i64) -> Result<Cart> {
        let result: Result<Cart> = async {
            self.require_session()?;
            match u32::try_from(quantity) {
                Ok(0) => self.sync(ApiRequest::delete(self.inner.routes.item(item_id))).await,
                Ok(quantity) => {
                    let request = ApiRequest::put(self.inner.routes.item(item_id))
                        .json(json!({ "quantity": quantity }));
                    self.sync(request).await
                }
                Err(_) if quantity < 0 => Err(ClientError::InvalidArgument(
                    "quantity cannot be negative".to_string(),
                )),
                Err(_) => Err(ClientError::InvalidArgument(format!(
                    "quantity {quantity} is too large"
                ))),
            }
        }
        .await;

        let message = if quantity == 0 {
            "Removed from cart"
        } else {
            "Cart updated"
        };
        self.report(result, message)
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// `AuthRequired` without a session, transport errors otherwise.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_item(&self, item_id: CartItemId) -> Result<Cart> {
        let result: Result<Cart> = async {
            self.require_session()?;
            self.sync(ApiRequest::delete(self.inner.routes.item(item_id)))
                .await
        }
        .await;

        self.report(result, "Removed from cart")
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// `AuthRequired` without a session, transport errors otherwise.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<()> {
        let result: Result<()> = async {
            self.require_session()?;
            let _in_flight = InFlight::enter(&self.inner.mirror);
            self.inner
                .transport
                .send(ApiRequest::delete(self.inner.routes.clear()))
                .await?;
            self.inner.mirror.write().clear();
            Ok(())
        }
        .await;

        self.report(result, "Cart cleared")
    }

    /// Apply a coupon code.
    ///
    /// # Errors
    ///
    /// `AuthRequired` without a session, `InvalidArgument` for a blank code,
    /// transport errors otherwise (including the server refusing the code).
    #[instrument(skip(self))]
    pub async fn apply_coupon(&self, code: &str) -> Result<Cart> {
        let result: Result<Cart> = async {
            self.require_session()?;
            let code = code.trim();
            if code.is_empty() {
                return Err(ClientError::InvalidArgument(
                    "coupon code cannot be empty".to_string(),
                ));
            }
            let request = ApiRequest::post(self.inner.routes.apply_coupon())
                .json(json!({ "couponCode": code }));
            self.sync(request).await
        }
        .await;

        self.report(result, "Coupon applied")
    }

    /// Remove the applied coupon.
    ///
    /// # Errors
    ///
    /// `AuthRequired` without a session, transport errors otherwise.
    #[instrument(skip(self))]
    pub async fn remove_coupon(&self) -> Result<Cart> {
        let result: Result<Cart> = async {
            self.require_session()?;
            self.sync(ApiRequest::delete(self.inner.routes.remove_coupon()))
                .await
        }
        .await;

        self.report(result, "Coupon removed")
    }

    /// Check the cart can proceed to checkout.
    ///
    /// Fails locally, without a request, when nobody is signed in or the
    /// mirror is empty; otherwise returns the server's verdict. Failures
    /// notify once; a verdict, valid or not, is returned without a notice
    /// and left to the caller to present.
    ///
    /// # Errors
    ///
    /// `CheckoutBlocked` for the local checks, transport errors otherwise.
    #[instrument(skip(self))]
    pub async fn validate_cart(&self) -> Result<CartValidation> {
        let result: Result<CartValidation> = async {
            if !self.inner.session.is_authenticated() {
                return Err(ClientError::CheckoutBlocked(
                    CheckoutBlocker::NotAuthenticated,
                ));
            }
            if self.item_count() == 0 {
                return Err(ClientError::CheckoutBlocked(CheckoutBlocker::EmptyCart));
            }
            let data = self
                .inner
                .transport
                .send(ApiRequest::post(self.inner.routes.validate()))
                .await?;
            decode_data::<CartValidation>(data, "validation result")
        }
        .await;

        result.map_err(|e| self.report_failure(e))
    }

    /// Send a mutation and replace the mirror with the returned cart.
    async fn sync(&self, request: ApiRequest) -> Result<Cart> {
        let _in_flight = InFlight::enter(&self.inner.mirror);
        let data = self.inner.transport.send(request).await?;
        let mut cart = checked(decode_data(data, "cart")?)?;
        warn_dropped(cart.retain_positive());

        if !self.inner.session.is_authenticated() {
            debug!("Session ended before the response arrived, mirror left as is");
            return Ok(cart);
        }

        self.inner.mirror.write().replace(cart.clone());
        debug!(items = cart.item_count(), "Cart mirror replaced");

        Ok(cart)
    }

    fn require_session(&self) -> Result<()> {
        if self.inner.session.is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::AuthRequired)
        }
    }

    /// Emit the single notice for an operation and hand back its result.
    fn report<T>(&self, result: Result<T>, success: &str) -> Result<T> {
        match result {
            Ok(value) => {
                self.inner.notifier.notify(Notice::success(success));
                Ok(value)
            }
            Err(e) => Err(self.report_failure(e)),
        }
    }

    fn report_failure(&self, error: ClientError) -> ClientError {
        if error.is_auth() {
            self.discard("authentication lost");
        }
        self.inner
            .notifier
            .notify(Notice::error(error.user_message()));
        error
    }

    fn discard(&self, reason: &str) {
        debug!(reason, "Discarding cart mirror");
        self.inner.mirror.write().discard();
    }

    // =========================================================================
    // Derived readers
    // =========================================================================

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> CartPhase {
        self.inner.mirror.read().phase()
    }

    /// Copy of the mirror.
    #[must_use]
    pub fn snapshot(&self) -> Option<Cart> {
        self.inner.mirror.read().cart().cloned()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.inner.mirror.read().cart().map_or(0, Cart::item_count)
    }

    /// Sum of unit price times quantity.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        self.inner
            .mirror
            .read()
            .cart()
            .and_then(Cart::subtotal)
            .unwrap_or(Decimal::ZERO)
    }

    /// Amount due after the coupon: the server total when it sent one,
    /// otherwise the derived total minus the discount.
    #[must_use]
    pub fn payable_total(&self) -> Decimal {
        self.inner
            .mirror
            .read()
            .cart()
            .and_then(|cart| cart.total.or_else(|| cart.discounted_subtotal()))
            .unwrap_or(Decimal::ZERO)
    }

    /// Whether a product has a line in the cart.
    #[must_use]
    pub fn is_in_cart(&self, product_id: ProductId) -> bool {
        self.cart_item(product_id).is_some()
    }

    /// The line holding a product.
    #[must_use]
    pub fn cart_item(&self, product_id: ProductId) -> Option<CartItem> {
        self.inner
            .mirror
            .read()
            .cart()
            .and_then(|cart| cart.find_product(product_id))
            .cloned()
    }

    /// Applied coupon code.
    #[must_use]
    pub fn coupon_code(&self) -> Option<String> {
        self.inner
            .mirror
            .read()
            .cart()
            .and_then(|cart| cart.coupon_code.clone())
    }
}

/// Refuse a cart whose subtotal cannot be computed.
fn checked(cart: Cart) -> Result<Cart> {
    if cart.subtotal().is_none() {
        return Err(ClientError::MalformedResponse(
            "cart total out of range".to_string(),
        ));
    }
    Ok(cart)
}

fn warn_dropped(dropped: usize) {
    if dropped > 0 {
        warn!(dropped, "Server returned cart lines with zero quantity");
    }
}
