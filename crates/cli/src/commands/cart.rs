//! Cart commands.
//!
//! Each command builds a [`CartClient`], performs one operation and prints
//! the resulting cart. The client's notices go to the log.

use shopfront_cart::CartClient;
use shopfront_core::{CartItemId, ProductId};

use super::{CliError, Context};
use crate::output;

fn client(ctx: &Context) -> Result<CartClient, CliError> {
    Ok(CartClient::from_config(&ctx.config, ctx.session.clone())?)
}

/// Print the current cart.
pub async fn show(ctx: &Context) -> Result<(), CliError> {
    let client = client(ctx)?;
    client.refresh().await?;
    output::cart(&client);
    Ok(())
}

pub async fn add(ctx: &Context, product_id: i32, quantity: u32) -> Result<(), CliError> {
    let client = client(ctx)?;
    client.add_item(ProductId::new(product_id), quantity).await?;
    output::cart(&client);
    Ok(())
}

pub async fn update(ctx: &Context, item_id: i32, quantity: i64) -> Result<(), CliError> {
    let client = client(ctx)?;
    let item_id = CartItemId::new(item_id);
    let cart = client.update_quantity(item_id, quantity).await?;
    if let Some(item) = cart.find_item(item_id) {
        tracing::info!(item_id = %item.id, quantity = item.quantity, "Line updated");
    }
    output::cart(&client);
    Ok(())
}

pub async fn remove(ctx: &Context, item_id: i32) -> Result<(), CliError> {
    let client = client(ctx)?;
    client.remove_item(CartItemId::new(item_id)).await?;
    output::cart(&client);
    Ok(())
}

pub async fn clear(ctx: &Context) -> Result<(), CliError> {
    let client = client(ctx)?;
    client.clear_cart().await?;
    output::cart(&client);
    Ok(())
}

pub async fn apply_coupon(ctx: &Context, code: &str) -> Result<(), CliError> {
    let client = client(ctx)?;
    client.apply_coupon(code).await?;
    output::cart(&client);
    Ok(())
}

pub async fn remove_coupon(ctx: &Context) -> Result<(), CliError> {
    let client = client(ctx)?;
    client.remove_coupon().await?;
    output::cart(&client);
    Ok(())
}

/// Load the cart and ask the server whether it can be checked out.
pub async fn validate(ctx: &Context) -> Result<(), CliError> {
    let client = client(ctx)?;
    client.load_cart().await;
    let verdict = client.validate_cart().await?;
    output::validation(&verdict);
    Ok(())
}
