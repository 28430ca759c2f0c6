//! Login command.
//!
//! The CLI keeps no state between invocations, so `login` prints the token
//! for the shell to export as `SHOPFRONT_API_TOKEN`.

use secrecy::{ExposeSecret, SecretString};
use shopfront_cart::AuthService;

use super::{CliError, Context};
use crate::output;

/// Sign in with email and password.
pub async fn login(ctx: &Context, email: &str, password: String) -> Result<(), CliError> {
    let auth = AuthService::from_config(&ctx.config, ctx.session.clone())?;
    let session = auth.login(email, &SecretString::from(password)).await?;

    output::line(&format!(
        "export SHOPFRONT_API_TOKEN={}",
        session.token().expose_secret()
    ));
    if let Some(expires_at) = session.expires_at {
        tracing::info!(%expires_at, "Session expires");
    }
    Ok(())
}
