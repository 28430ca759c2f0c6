//! In-memory state behind the fake backend.

use std::collections::HashMap;

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use shopfront_core::{Cart, CartId, CartItem, CartItemId, ProductId, ProductSnapshot, UserId};

/// A failed request, rendered as a `success: false` envelope.
#[derive(Debug)]
pub struct Rejection {
    pub status: StatusCode,
    pub message: String,
}

impl Rejection {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }
}

/// A request as the backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub request_id: Option<String>,
    pub bearer: bool,
}

struct Account {
    email: String,
    password: String,
    user_id: UserId,
    name: String,
}

pub struct Store {
    pub healthy: bool,
    pub requests: Vec<RecordedRequest>,
    products: HashMap<ProductId, ProductSnapshot>,
    accounts: Vec<Account>,
    tokens: HashMap<String, UserId>,
    carts: HashMap<UserId, Cart>,
    /// Coupon code to percentage off.
    coupons: HashMap<String, Decimal>,
    next_id: i32,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            healthy: true,
            requests: Vec::new(),
            products: HashMap::new(),
            accounts: Vec::new(),
            tokens: HashMap::new(),
            carts: HashMap::new(),
            coupons: HashMap::new(),
            next_id: 1,
        }
    }
}

impl Store {
    fn next_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    pub fn add_product(&mut self, product: ProductSnapshot) {
        self.products.insert(product.id, product);
    }

    pub fn set_stock(&mut self, id: ProductId, stock: u32) {
        if let Some(product) = self.products.get_mut(&id) {
            product.stock = Some(stock);
        }
    }

    pub fn add_account(&mut self, email: &str, password: &str, name: &str) -> UserId {
        let user_id = UserId::new(self.next_id());
        self.accounts.push(Account {
            email: email.to_string(),
            password: password.to_string(),
            user_id,
            name: name.to_string(),
        });
        user_id
    }

    pub fn add_coupon(&mut self, code: &str, percent_off: Decimal) {
        self.coupons.insert(code.to_string(), percent_off);
    }

    pub fn revoke_tokens(&mut self) {
        self.tokens.clear();
    }

    pub fn cart_of(&self, user: UserId) -> Option<Cart> {
        self.carts.get(&user).cloned()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    pub fn login(&mut self, email: &str, password: &str) -> Result<Value, Rejection> {
        let (user_id, email, name) = self
            .accounts
            .iter()
            .find(|a| a.email == email && a.password == password)
            .map(|a| (a.user_id, a.email.clone(), a.name.clone()))
            .ok_or_else(|| Rejection::new(StatusCode::UNAUTHORIZED, "Invalid email or password"))?;

        let token = uuid::Uuid::new_v4().to_string();
        self.tokens.insert(token.clone(), user_id);
        Ok(json!({
            "token": token,
            "user": { "id": user_id, "email": email, "name": name },
            "expiresIn": 3600,
        }))
    }

    pub fn user_for_token(&self, token: &str) -> Option<UserId> {
        self.tokens.get(token).copied()
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub fn product(&self, id: ProductId) -> Result<ProductSnapshot, Rejection> {
        self.products
            .get(&id)
            .cloned()
            .ok_or_else(|| Rejection::not_found("Product"))
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn cart(&self, user: UserId) -> Result<Cart, Rejection> {
        self.carts
            .get(&user)
            .cloned()
            .ok_or_else(|| Rejection::not_found("Cart"))
    }

    pub fn add(
        &mut self,
        user: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, Rejection> {
        if quantity == 0 {
            return Err(Rejection::new(
                StatusCode::BAD_REQUEST,
                "Quantity must be at least 1",
            ));
        }
        let product = self.product(product_id)?;

        if !self.carts.contains_key(&user) {
            let cart = Cart {
                id: Some(CartId::new(self.next_id())),
                ..Cart::default()
            };
            self.carts.insert(user, cart);
        }
        let new_item_id = CartItemId::new(self.next_id);

        let cart = self.cart_mut(user)?;
        let existing = cart.find_product(product_id).map_or(0, |item| item.quantity);
        check_stock(&product, existing + quantity)?;

        if let Some(item) = cart.items.iter_mut().find(|i| i.product.id == product_id) {
            item.quantity += quantity;
        } else {
            cart.items.push(CartItem {
                id: new_item_id,
                price: product.price,
                product,
                quantity,
            });
            self.next_id += 1;
        }
        self.priced(user)
    }

    pub fn set_quantity(
        &mut self,
        user: UserId,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<Cart, Rejection> {
        if quantity == 0 {
            return self.remove(user, item_id);
        }
        let product_id = self
            .cart_mut(user)?
            .find_item(item_id)
            .map(|item| item.product.id)
            .ok_or_else(|| Rejection::not_found("Cart item"))?;
        check_stock(&self.product(product_id)?, quantity)?;

        let cart = self.cart_mut(user)?;
        if let Some(item) = cart.items.iter_mut().find(|i| i.id == item_id) {
            item.quantity = quantity;
        }
        self.priced(user)
    }

    pub fn remove(&mut self, user: UserId, item_id: CartItemId) -> Result<Cart, Rejection> {
        let cart = self.cart_mut(user)?;
        let before = cart.items.len();
        cart.items.retain(|item| item.id != item_id);
        if cart.items.len() == before {
            return Err(Rejection::not_found("Cart item"));
        }
        self.priced(user)
    }

    pub fn clear(&mut self, user: UserId) -> Result<(), Rejection> {
        let cart = self.cart_mut(user)?;
        cart.items.clear();
        cart.coupon_code = None;
        self.priced(user).map(|_| ())
    }

    /// Unknown codes answer HTTP 200 with `success: false`.
    pub fn apply_coupon(&mut self, user: UserId, code: &str) -> Result<Cart, Rejection> {
        if !self.coupons.contains_key(code) {
            return Err(Rejection::new(StatusCode::OK, "Invalid coupon code"));
        }
        self.cart_mut(user)?.coupon_code = Some(code.to_string());
        self.priced(user)
    }

    pub fn remove_coupon(&mut self, user: UserId) -> Result<Cart, Rejection> {
        self.cart_mut(user)?.coupon_code = None;
        self.priced(user)
    }

    pub fn validate(&self, user: UserId) -> Result<Value, Rejection> {
        let cart = self.cart(user)?;
        let issues: Vec<String> = cart
            .items
            .iter()
            .filter_map(|item| {
                let stock = self.products.get(&item.product.id)?.stock?;
                (item.quantity > stock).then(|| {
                    format!("Only {stock} of {} left in stock", item.product.name)
                })
            })
            .collect();
        Ok(json!({ "valid": issues.is_empty(), "issues": issues }))
    }

    fn cart_mut(&mut self, user: UserId) -> Result<&mut Cart, Rejection> {
        self.carts
            .get_mut(&user)
            .ok_or_else(|| Rejection::not_found("Cart"))
    }

    /// Recompute discount and total, returning a copy of the cart.
    fn priced(&mut self, user: UserId) -> Result<Cart, Rejection> {
        let percent = self
            .carts
            .get(&user)
            .and_then(|cart| cart.coupon_code.as_ref())
            .and_then(|code| self.coupons.get(code))
            .copied();

        let cart = self.cart_mut(user)?;
        let subtotal = cart.subtotal().ok_or_else(|| {
            Rejection::new(StatusCode::UNPROCESSABLE_ENTITY, "Cart total out of range")
        })?;
        let discount = percent.map(|p| (subtotal * p / Decimal::ONE_HUNDRED).round_dp(2));
        cart.discount = discount;
        cart.total = Some(subtotal - discount.unwrap_or_default());
        Ok(cart.clone())
    }
}

fn check_stock(product: &ProductSnapshot, wanted: u32) -> Result<(), Rejection> {
    match product.stock {
        Some(stock) if wanted > stock => Err(Rejection::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Only {stock} left in stock"),
        )),
        _ => Ok(()),
    }
}
