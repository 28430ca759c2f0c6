//! Product lookup.

use shopfront_cart::CatalogClient;
use shopfront_core::ProductId;

use super::{CliError, Context};
use crate::output;

pub async fn product(ctx: &Context, id: i32) -> Result<(), CliError> {
    let catalog = CatalogClient::from_config(&ctx.config, ctx.session.clone())?;
    let product = catalog.product(ProductId::new(id)).await?;
    output::product(&product);
    Ok(())
}
