//! Cart endpoint paths.
//!
//! Storefront variants mount the cart API under different prefixes
//! (`/cart`, `/api/cart`, ...); the shape below the prefix is fixed.

use shopfront_core::CartItemId;

/// Paths of the cart endpoints under a configurable prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRoutes {
    prefix: String,
}

impl Default for CartRoutes {
    fn default() -> Self {
        Self::new("/cart")
    }
}

impl CartRoutes {
    /// Routes under `prefix` (e.g. `/cart`); trailing slashes are ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    /// `GET` the current cart.
    #[must_use]
    pub fn cart(&self) -> String {
        if self.prefix.is_empty() {
            "/".to_string()
        } else {
            self.prefix.clone()
        }
    }

    /// `POST` a new line.
    #[must_use]
    pub fn add(&self) -> String {
        format!("{}/add", self.prefix)
    }

    /// `PUT` or `DELETE` one line.
    #[must_use]
    pub fn item(&self, item_id: CartItemId) -> String {
        format!("{}/items/{item_id}", self.prefix)
    }

    /// `DELETE` every line.
    #[must_use]
    pub fn clear(&self) -> String {
        format!("{}/clear", self.prefix)
    }

    /// `POST` a coupon code.
    #[must_use]
    pub fn apply_coupon(&self) -> String {
        format!("{}/apply-coupon", self.prefix)
    }

    /// `DELETE` the applied coupon.
    #[must_use]
    pub fn remove_coupon(&self) -> String {
        format!("{}/remove-coupon", self.prefix)
    }

    /// `POST` for server-side checkout validation.
    #[must_use]
    pub fn validate(&self) -> String {
        format!("{}/validate", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routes() {
        let routes = CartRoutes::default();
        assert_eq!(routes.cart(), "/cart");
        assert_eq!(routes.add(), "/cart/add");
        assert_eq!(routes.item(CartItemId::new(7)), "/cart/items/7");
        assert_eq!(routes.clear(), "/cart/clear");
        assert_eq!(routes.apply_coupon(), "/cart/apply-coupon");
        assert_eq!(routes.remove_coupon(), "/cart/remove-coupon");
    }

    #[test]
    fn test_custom_prefix() {
        let routes = CartRoutes::new("/api/v1/cart/");
        assert_eq!(routes.cart(), "/api/v1/cart");
        assert_eq!(routes.validate(), "/api/v1/cart/validate");
    }
}
