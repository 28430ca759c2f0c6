//! Command implementations.
//!
//! # Environment Variables
//!
//! - `SHOPFRONT_API_URL` - Base URL of the storefront REST API
//! - `SHOPFRONT_API_TOKEN` - Session token printed by `shopfront login`

pub mod auth;
pub mod cart;
pub mod catalog;

use shopfront_cart::{ClientConfig, ClientError, ConfigError, Session, SessionStore};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The client reported a failure.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Configuration plus the session every command runs under.
pub struct Context {
    pub config: ClientConfig,
    pub session: SessionStore,
}

impl Context {
    /// Load configuration and bootstrap the session from `SHOPFRONT_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` if the environment is incomplete.
    pub fn load() -> Result<Self, CliError> {
        let config = ClientConfig::from_env()?;
        let session = config
            .api_token
            .clone()
            .map_or_else(SessionStore::new, |token| {
                SessionStore::with_session(Session::new(token))
            });

        tracing::debug!(?config, "Configuration loaded");
        Ok(Self { config, session })
    }
}
