//! Cart data model shared by the client and the backend fixtures.
//!
//! A [`Cart`] is always the server's view: the client replaces its copy
//! wholesale after every operation and only folds over it to derive counts
//! and totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CartId, CartItemId, ProductId};

/// Read-only product view embedded in a cart line.
///
/// This is a snapshot taken when the line was written, not a live join, so
/// price or stock changes on the product do not show up until the server
/// sends a new cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current list price.
    pub price: Decimal,
    /// Units in stock, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    /// Primary image URL.
    #[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A single product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Server-assigned line ID.
    pub id: CartItemId,
    /// Product snapshot.
    pub product: ProductSnapshot,
    /// Quantity; a valid line always has at least one unit.
    pub quantity: u32,
    /// Unit price captured when the line was added.
    pub price: Decimal,
}

impl CartItem {
    /// Unit price times quantity, or `None` if it does not fit a `Decimal`.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// A shopping cart as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart ID, absent until the server creates the cart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CartId>,
    /// Lines in display order.
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Applied coupon code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    /// Discount granted by the coupon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    /// Server-computed total after discounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
}

impl Cart {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |count, item| count.saturating_add(item.quantity))
    }

    /// Sum of unit price times quantity over all lines.
    ///
    /// `None` when any line total or the running sum overflows.
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |sum, item| {
            item.line_total().and_then(|line| sum.checked_add(line))
        })
    }

    /// Subtotal minus the coupon discount, floored at zero.
    #[must_use]
    pub fn discounted_subtotal(&self) -> Option<Decimal> {
        self.subtotal()?
            .checked_sub(self.discount.unwrap_or_default())
            .map(|amount| amount.max(Decimal::ZERO))
    }

    /// Line holding the given product, if any.
    #[must_use]
    pub fn find_product(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == product_id)
    }

    /// Line with the given line ID, if any.
    #[must_use]
    pub fn find_item(&self, item_id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Drop lines whose quantity is zero, returning how many were dropped.
    pub fn retain_positive(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.quantity > 0);
        before - self.items.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, product: i32, price: Decimal, quantity: u32) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            product: ProductSnapshot {
                id: ProductId::new(product),
                name: format!("Product {product}"),
                price,
                stock: None,
                image: None,
            },
            quantity,
            price,
        }
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let cart = Cart {
            items: vec![
                item(1, 42, Decimal::new(10, 0), 2),
                item(2, 7, Decimal::new(350, 2), 3),
            ],
            ..Cart::default()
        };
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_subtotal_uses_decimal_arithmetic() {
        let cart = Cart {
            items: vec![
                item(1, 1, Decimal::new(1, 1), 1),
                item(2, 2, Decimal::new(2, 1), 1),
            ],
            ..Cart::default()
        };
        assert_eq!(cart.subtotal(), Some(Decimal::new(3, 1)));
    }

    #[test]
    fn test_empty_cart_folds_to_zero() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.subtotal(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_subtotal_overflow_is_none() {
        let cart = Cart {
            items: vec![item(1, 1, Decimal::MAX, 2)],
            ..Cart::default()
        };
        assert_eq!(cart.items[0].line_total(), None);
        assert_eq!(cart.subtotal(), None);
        assert_eq!(cart.discounted_subtotal(), None);

        let cart = Cart {
            items: vec![item(1, 1, Decimal::MAX, 1), item(2, 2, Decimal::MAX, 1)],
            ..Cart::default()
        };
        assert_eq!(cart.subtotal(), None);
    }

    #[test]
    fn test_discounted_subtotal_floors_at_zero() {
        let mut cart = Cart {
            items: vec![item(1, 1, Decimal::new(1000, 2), 2)],
            discount: Some(Decimal::new(200, 2)),
            ..Cart::default()
        };
        assert_eq!(cart.discounted_subtotal(), Some(Decimal::new(1800, 2)));

        cart.discount = Some(Decimal::new(5000, 2));
        assert_eq!(cart.discounted_subtotal(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_find_by_product_and_line() {
        let cart = Cart {
            items: vec![item(9, 42, Decimal::ONE, 1)],
            ..Cart::default()
        };
        assert_eq!(
            cart.find_product(ProductId::new(42)).map(|i| i.id),
            Some(CartItemId::new(9))
        );
        assert!(cart.find_item(CartItemId::new(9)).is_some());
        assert!(cart.find_product(ProductId::new(1)).is_none());
    }

    #[test]
    fn test_retain_positive_drops_zero_lines() {
        let mut cart = Cart {
            items: vec![item(1, 1, Decimal::ONE, 0), item(2, 2, Decimal::ONE, 4)],
            ..Cart::default()
        };
        assert_eq!(cart.retain_positive(), 1);
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn test_deserializes_backend_shape() {
        let json = r#"{
            "id": 3,
            "items": [{
                "id": 11,
                "product": {"id": 42, "name": "Mug", "price": 10, "stock": 5, "imageUrl": "/mug.png"},
                "quantity": 2,
                "price": "10.00"
            }],
            "couponCode": "SAVE10"
        }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.id, Some(CartId::new(3)));
        assert_eq!(cart.coupon_code.as_deref(), Some("SAVE10"));
        assert_eq!(cart.subtotal(), Some(Decimal::new(20, 0)));
        assert_eq!(cart.items[0].product.image.as_deref(), Some("/mug.png"));
    }
}
