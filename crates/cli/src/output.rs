//! Plain-text rendering to stdout.

#![allow(clippy::print_stdout)]

use rust_decimal::Decimal;
use shopfront_cart::{CartClient, CartValidation};
use shopfront_core::{CartItem, Price, ProductSnapshot};

pub fn line(text: &str) {
    println!("{text}");
}

fn usd(amount: Decimal) -> Price {
    Price::usd(amount)
}

fn item_line(item: &CartItem) -> String {
    format!(
        "  [{}] {} x{} @ {} = {}",
        item.id,
        item.product.name,
        item.quantity,
        usd(item.price),
        item.line_total()
            .map_or_else(|| "n/a".to_string(), |total| usd(total).to_string()),
    )
}

/// Print the client's mirror with its derived totals.
pub fn cart(client: &CartClient) {
    let Some(cart) = client.snapshot().filter(|cart| !cart.is_empty()) else {
        println!("Cart is empty");
        return;
    };

    match cart.id {
        Some(id) => println!("Cart #{id}"),
        None => println!("Cart"),
    }
    for item in &cart.items {
        println!("{}", item_line(item));
    }
    println!("Items:    {}", client.item_count());
    println!("Subtotal: {}", usd(client.cart_total()));
    if let Some(code) = client.coupon_code() {
        let discount = cart.discount.unwrap_or_default();
        println!("Coupon:   {code} (-{})", usd(discount));
    }
    println!("Total:    {}", usd(client.payable_total()));
}

pub fn validation(verdict: &CartValidation) {
    if verdict.valid {
        println!("Cart is ready for checkout");
    } else {
        println!("Cart cannot be checked out:");
        for issue in &verdict.issues {
            println!("  - {issue}");
        }
    }
}

pub fn product(product: &ProductSnapshot) {
    println!("[{}] {}", product.id, product.name);
    println!("Price: {}", usd(product.price));
    match product.stock {
        Some(0) => println!("Out of stock"),
        Some(stock) => println!("In stock: {stock}"),
        None => {}
    }
    if let Some(image) = &product.image {
        println!("Image: {image}");
    }
}

#[cfg(test)]
mod tests {
    use shopfront_core::{CartItemId, ProductId};

    use super::*;

    #[test]
    fn test_item_line_formats_prices() {
        let item = CartItem {
            id: CartItemId::new(7),
            product: ProductSnapshot {
                id: ProductId::new(42),
                name: "Mug".to_string(),
                price: Decimal::new(1250, 2),
                stock: None,
                image: None,
            },
            quantity: 2,
            price: Decimal::new(1250, 2),
        };
        assert_eq!(item_line(&item), "  [7] Mug x2 @ $12.50 = $25.00");
    }
}
