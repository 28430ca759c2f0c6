//! In-memory fixture accounts.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use shopfront_core::{Email, UserId};
use tracing::debug;
use uuid::Uuid;

use super::SessionResolver;
use crate::error::{ClientError, Result};
use crate::session::{Session, SessionUser};

/// A fixture account accepted by [`LocalResolver`].
pub struct LocalAccount {
    pub user: SessionUser,
    password: SecretString,
}

impl LocalAccount {
    #[must_use]
    pub const fn new(user: SessionUser, password: SecretString) -> Self {
        Self { user, password }
    }
}

/// Resolves sessions against a fixed account list.
///
/// Issued tokens are opaque `local-<uuid>` strings that no real backend
/// accepts; they only satisfy the client-side session gate.
#[derive(Default)]
pub struct LocalResolver {
    accounts: Vec<LocalAccount>,
}

impl LocalResolver {
    #[must_use]
    pub const fn new(accounts: Vec<LocalAccount>) -> Self {
        Self { accounts }
    }

    /// One account: `demo@shopfront.test` / `demo1234`.
    #[must_use]
    pub fn demo() -> Self {
        let accounts = Email::parse("demo@shopfront.test")
            .into_iter()
            .map(|email| {
                LocalAccount::new(
                    SessionUser {
                        id: UserId::new(1),
                        email,
                        name: Some("Demo Shopper".to_string()),
                    },
                    SecretString::from("demo1234".to_string()),
                )
            })
            .collect();
        Self::new(accounts)
    }
}

#[async_trait]
impl SessionResolver for LocalResolver {
    async fn login(&self, email: &Email, password: &SecretString) -> Result<Session> {
        let account = self
            .accounts
            .iter()
            .find(|account| &account.user.email == email)
            .filter(|account| account.password.expose_secret() == password.expose_secret())
            .ok_or(ClientError::InvalidCredentials)?;

        debug!(user_id = %account.user.id, "Local account matched");
        let token = format!("local-{}", Uuid::new_v4());
        Ok(Session::new(SecretString::from(token)).with_user(account.user.clone()))
    }

    async fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_account_logs_in() {
        let resolver = LocalResolver::demo();
        let email = Email::parse("DEMO@Shopfront.test").unwrap();
        let session = resolver
            .login(&email, &SecretString::from("demo1234".to_string()))
            .await;
        // Local part is case-sensitive.
        assert!(matches!(session, Err(ClientError::InvalidCredentials)));

        let email = Email::parse("demo@SHOPFRONT.test").unwrap();
        let session = resolver
            .login(&email, &SecretString::from("demo1234".to_string()))
            .await
            .unwrap();
        assert!(session.token().expose_secret().starts_with("local-"));
        assert_eq!(session.user.unwrap().id, UserId::new(1));
    }

    #[tokio::test]
    async fn test_unknown_account_is_rejected() {
        let resolver = LocalResolver::demo();
        let email = Email::parse("someone@example.com").unwrap();
        let err = resolver
            .login(&email, &SecretString::from("demo1234".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let resolver = LocalResolver::demo();
        let email = Email::parse("demo@shopfront.test").unwrap();
        let password = SecretString::from("demo1234".to_string());
        let first = resolver.login(&email, &password).await.unwrap();
        let second = resolver.login(&email, &password).await.unwrap();
        assert_ne!(
            first.token().expose_secret(),
            second.token().expose_secret()
        );
    }
}
