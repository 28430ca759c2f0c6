//! Login against the storefront backend.
//!
//! A [`SessionResolver`] turns credentials into a [`Session`]. Three are
//! provided:
//!
//! - [`RemoteResolver`]: `POST /auth/login` on the backend
//! - [`LocalResolver`]: fixture accounts held in memory, for demos and
//!   offline development
//! - [`FallbackResolver`]: asks the remote backend whether it is up and
//!   only falls back to the local accounts when it is not
//!
//! [`AuthService`] wraps a resolver and publishes the result to the shared
//! [`SessionStore`], which the transport and cart client follow.

mod fallback;
mod local;
mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use shopfront_core::Email;
use tracing::{info, instrument};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::{Session, SessionStore};
use crate::transport::{HttpTransport, Transport};

pub use fallback::FallbackResolver;
pub use local::{LocalAccount, LocalResolver};
pub use remote::RemoteResolver;

/// Turns credentials into a session.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Authenticate and return the new session.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` or `ServerRejected` when the credentials are
    /// refused, transport errors otherwise.
    async fn login(&self, email: &Email, password: &SecretString) -> Result<Session>;

    /// Whether the resolver can currently serve a login.
    async fn is_available(&self) -> bool;
}

/// Login and logout on top of a [`SessionResolver`].
#[derive(Clone)]
pub struct AuthService {
    resolver: Arc<dyn SessionResolver>,
    store: SessionStore,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    #[must_use]
    pub fn new(resolver: Arc<dyn SessionResolver>, store: SessionStore) -> Self {
        Self { resolver, store }
    }

    /// Remote login over HTTP, with the local fixture accounts as a fallback
    /// when `auth_fallback` is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig, store: SessionStore) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config, store.clone())?);
        let remote = Arc::new(RemoteResolver::new(transport));

        let resolver: Arc<dyn SessionResolver> = if config.auth_fallback {
            Arc::new(FallbackResolver::new(remote, Arc::new(LocalResolver::demo())))
        } else {
            remote
        };

        Ok(Self::new(resolver, store))
    }

    /// Sign in and publish the session.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a malformed email, otherwise whatever the
    /// resolver returns. The store is untouched on failure.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session> {
        let email = Email::parse(email).map_err(|e| ClientError::InvalidArgument(e.to_string()))?;
        let session = self.resolver.login(&email, password).await?;
        info!(email = %email, "Signed in");
        self.store.sign_in(session.clone());
        Ok(session)
    }

    /// End the session.
    pub fn logout(&self) {
        self.store.sign_out();
    }

    /// The store sessions are published to.
    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }
}
