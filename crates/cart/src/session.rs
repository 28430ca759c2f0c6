//! Session store shared by the transport and the cart client.
//!
//! The store is the one place that knows whether a shopper is signed in.
//! Changes are broadcast on a `tokio::sync::watch` channel so the cart client
//! can discard its mirror the moment a session ends, whether the user signed
//! out or the server revoked the token with a 401.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Deserialize;
use shopfront_core::{Email, UserId};
use tokio::sync::watch;
use tracing::{info, warn};

/// Account the session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: Email,
    #[serde(default)]
    pub name: Option<String>,
}

/// An authenticated session.
///
/// Implements `Debug` manually to redact the bearer token.
#[derive(Clone)]
pub struct Session {
    token: SecretString,
    /// Signed-in account, when the backend reported one.
    pub user: Option<SessionUser>,
    /// Token expiry, when the backend reported one.
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Session {
    /// A session holding only a bearer token.
    #[must_use]
    pub const fn new(token: SecretString) -> Self {
        Self {
            token,
            user: None,
            expires_at: None,
        }
    }

    /// Attach the account.
    #[must_use]
    pub fn with_user(mut self, user: SessionUser) -> Self {
        self.user = Some(user);
        self
    }

    /// Attach an expiry.
    #[must_use]
    pub const fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Bearer token.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    /// Whether the token is past its expiry at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// Authentication state broadcast to subscribers.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// Nobody is signed in.
    SignedOut,
    /// A session is active.
    SignedIn(Session),
    /// The server rejected the session; the consumer should show its login view.
    Expired,
}

impl AuthState {
    /// Whether a session is active.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    /// Whether the consumer should navigate to its login view.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::Expired)
    }
}

/// Shared, cloneable handle to the current session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<watch::Sender<AuthState>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.inner.borrow())
            .finish()
    }
}

impl SessionStore {
    /// A store with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(watch::Sender::new(AuthState::SignedOut)),
        }
    }

    /// A store that starts signed in.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        let store = Self::new();
        store.sign_in(session);
        store
    }

    /// Replace the current session.
    pub fn sign_in(&self, session: Session) {
        info!(user = ?session.user.as_ref().map(|u| u.id), "Session established");
        self.inner.send_replace(AuthState::SignedIn(session));
    }

    /// End the session at the user's request.
    pub fn sign_out(&self) {
        if self.inner.borrow().is_signed_in() {
            info!("Session ended");
        }
        self.inner.send_replace(AuthState::SignedOut);
    }

    /// Drop credentials after the server rejected them.
    pub fn expire(&self) {
        warn!("Server rejected session credentials, login required");
        self.inner.send_replace(AuthState::Expired);
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.inner.borrow().clone()
    }

    /// Active, unexpired session.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        match &*self.inner.borrow() {
            AuthState::SignedIn(session) if !session.is_expired_at(Utc::now()) => {
                Some(session.clone())
            }
            _ => None,
        }
    }

    /// Whether an unexpired session is active.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// Bearer token of the active session.
    #[must_use]
    pub fn bearer_token(&self) -> Option<SecretString> {
        self.current().map(|session| session.token)
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use secrecy::ExposeSecret;

    use super::*;

    fn session(token: &str) -> Session {
        Session::new(SecretString::from(token.to_string()))
    }

    #[test]
    fn test_starts_signed_out() {
        let store = SessionStore::new();
        assert!(!store.is_authenticated());
        assert!(store.bearer_token().is_none());
        assert!(!store.state().requires_login());
    }

    #[test]
    fn test_sign_in_exposes_token() {
        let store = SessionStore::with_session(session("tok-1"));
        assert!(store.is_authenticated());
        assert_eq!(store.bearer_token().unwrap().expose_secret(), "tok-1");
    }

    #[test]
    fn test_expired_session_is_not_current() {
        let expired = session("tok-1").with_expiry(Utc::now() - Duration::minutes(1));
        let store = SessionStore::with_session(expired);
        assert!(store.state().is_signed_in());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_expire_requires_login() {
        let store = SessionStore::with_session(session("tok-1"));
        store.expire();
        assert!(!store.is_authenticated());
        assert!(store.state().requires_login());
    }

    #[tokio::test]
    async fn test_subscribers_see_sign_out() {
        let store = SessionStore::with_session(session("tok-1"));
        let mut rx = store.subscribe();
        store.sign_out();
        rx.changed().await.unwrap();
        assert!(matches!(*rx.borrow(), AuthState::SignedOut));
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug_output = format!("{:?}", session("super_secret_token"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }
}
