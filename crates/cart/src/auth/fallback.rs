//! Primary/secondary resolver selection.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use shopfront_core::Email;
use tracing::{instrument, warn};

use super::SessionResolver;
use crate::error::Result;
use crate::session::Session;

/// Uses `primary` while it reports itself available, `secondary` otherwise.
///
/// The choice is made by probing before each login, never by inspecting
/// the primary's errors: once the primary is up, its refusals are final.
pub struct FallbackResolver {
    primary: Arc<dyn SessionResolver>,
    secondary: Arc<dyn SessionResolver>,
}

impl FallbackResolver {
    #[must_use]
    pub fn new(primary: Arc<dyn SessionResolver>, secondary: Arc<dyn SessionResolver>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl SessionResolver for FallbackResolver {
    #[instrument(skip_all)]
    async fn login(&self, email: &Email, password: &SecretString) -> Result<Session> {
        if self.primary.is_available().await {
            self.primary.login(email, password).await
        } else {
            warn!("Auth backend unavailable, using local accounts");
            self.secondary.login(email, password).await
        }
    }

    async fn is_available(&self) -> bool {
        self.primary.is_available().await || self.secondary.is_available().await
    }
}
