//! The client-held copy of the server cart.
//!
//! The mirror is disposable: every successful operation replaces it with the
//! server's response. It only tracks enough bookkeeping to report a phase.

use parking_lot::RwLock;
use shopfront_core::Cart;

/// Lifecycle phase of a cart client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartPhase {
    /// Nothing loaded yet.
    Uninitialized,
    /// Initial or refresh fetch in progress.
    Loading,
    /// Mirror holds at least one line.
    Ready,
    /// Mirror is empty or absent.
    Empty,
    /// At least one mutation is in flight.
    Mutating,
}

#[derive(Debug, Default)]
pub(crate) struct CartMirror {
    cart: Option<Cart>,
    initialized: bool,
    loading: bool,
    in_flight: usize,
}

impl CartMirror {
    pub(crate) fn phase(&self) -> CartPhase {
        if self.in_flight > 0 {
            CartPhase::Mutating
        } else if self.loading {
            CartPhase::Loading
        } else if !self.initialized {
            CartPhase::Uninitialized
        } else if self.cart.as_ref().is_some_and(|cart| !cart.is_empty()) {
            CartPhase::Ready
        } else {
            CartPhase::Empty
        }
    }

    pub(crate) const fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    pub(crate) const fn begin_load(&mut self) {
        self.loading = true;
    }

    /// End a load without touching the mirror.
    pub(crate) const fn abort_load(&mut self) {
        self.loading = false;
    }

    /// Finish a load; `None` means the server has no cart for this user.
    pub(crate) fn finish_load(&mut self, cart: Option<Cart>) -> usize {
        self.loading = false;
        match cart {
            Some(cart) => self.replace(cart),
            None => {
                self.discard();
                0
            }
        }
    }

    /// Replace the mirror with a server response; returns dropped zero lines.
    pub(crate) fn replace(&mut self, mut cart: Cart) -> usize {
        let dropped = cart.retain_positive();
        self.cart = Some(cart);
        self.initialized = true;
        dropped
    }

    /// Empty the lines but keep the cart identity.
    pub(crate) fn clear(&mut self) {
        let id = self.cart.as_ref().and_then(|cart| cart.id);
        self.cart = Some(Cart {
            id,
            ..Cart::default()
        });
        self.initialized = true;
    }

    /// Forget the cart entirely; phase becomes `Empty`.
    pub(crate) fn discard(&mut self) {
        self.cart = None;
        self.initialized = true;
        self.loading = false;
    }

    /// Back to `Uninitialized`.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Marks a mutation in flight for as long as it lives.
///
/// Dropping the operation future drops the guard, so an abandoned request
/// never leaves the phase stuck at `Mutating`.
pub(crate) struct InFlight<'a> {
    mirror: &'a RwLock<CartMirror>,
}

impl<'a> InFlight<'a> {
    pub(crate) fn enter(mirror: &'a RwLock<CartMirror>) -> Self {
        mirror.write().in_flight += 1;
        Self { mirror }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut mirror = self.mirror.write();
        mirror.in_flight = mirror.in_flight.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use shopfront_core::{CartId, CartItem, CartItemId, ProductId, ProductSnapshot};

    use super::*;

    fn cart_with(quantity: u32) -> Cart {
        Cart {
            id: Some(CartId::new(1)),
            items: vec![CartItem {
                id: CartItemId::new(1),
                product: ProductSnapshot {
                    id: ProductId::new(42),
                    name: "Mug".to_string(),
                    price: Decimal::TEN,
                    stock: None,
                    image: None,
                },
                quantity,
                price: Decimal::TEN,
            }],
            ..Cart::default()
        }
    }

    #[test]
    fn test_phase_progression() {
        let mut mirror = CartMirror::default();
        assert_eq!(mirror.phase(), CartPhase::Uninitialized);

        mirror.begin_load();
        assert_eq!(mirror.phase(), CartPhase::Loading);

        mirror.finish_load(None);
        assert_eq!(mirror.phase(), CartPhase::Empty);

        mirror.replace(cart_with(2));
        assert_eq!(mirror.phase(), CartPhase::Ready);

        mirror.clear();
        assert_eq!(mirror.phase(), CartPhase::Empty);
        assert_eq!(mirror.cart().and_then(|c| c.id), Some(CartId::new(1)));

        mirror.reset();
        assert_eq!(mirror.phase(), CartPhase::Uninitialized);
    }

    #[test]
    fn test_replace_drops_zero_quantity_lines() {
        let mut mirror = CartMirror::default();
        assert_eq!(mirror.replace(cart_with(0)), 1);
        assert_eq!(mirror.phase(), CartPhase::Empty);
    }

    #[test]
    fn test_in_flight_guard_restores_phase() {
        let lock = RwLock::new(CartMirror::default());
        lock.write().replace(cart_with(1));
        {
            let _first = InFlight::enter(&lock);
            let _second = InFlight::enter(&lock);
            assert_eq!(lock.read().phase(), CartPhase::Mutating);
        }
        assert_eq!(lock.read().phase(), CartPhase::Ready);
    }
}
