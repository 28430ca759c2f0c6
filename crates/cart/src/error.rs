//! Client error taxonomy.
//!
//! Every public operation returns [`Result`]. Errors are surfaced to the
//! caller unchanged; the client never retries or recovers on its own.

use thiserror::Error;

use crate::config::ConfigError;

/// Reasons the client refuses to start a checkout before asking the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutBlocker {
    /// No signed-in session.
    NotAuthenticated,
    /// The mirror has no lines.
    EmptyCart,
}

impl std::fmt::Display for CheckoutBlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => f.write_str("sign in to check out"),
            Self::EmptyCart => f.write_str("cart is empty"),
        }
    }
}

/// Errors returned by the cart, auth and catalog clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No session, or the server revoked it with a 401.
    #[error("authentication required")]
    AuthRequired,

    /// Caller passed a value the operation cannot accept.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The request never produced an HTTP response.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// Non-2xx status, or a `success: false` envelope.
    #[error("server rejected request ({}): {message}", status_label(.status.as_ref()))]
    ServerRejected {
        /// HTTP status, when one was received.
        status: Option<u16>,
        /// Server-provided message.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Client-side checkout guard failed.
    #[error("checkout blocked: {0}")]
    CheckoutBlocked(CheckoutBlocker),

    /// Credentials rejected by a local resolver.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Client could not be constructed from its configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Build a `ServerRejected` error.
    pub fn rejected(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::ServerRejected {
            status,
            message: message.into(),
        }
    }

    /// Whether the failure means the session is gone.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::AuthRequired | Self::CheckoutBlocked(CheckoutBlocker::NotAuthenticated)
        )
    }

    /// Short message suitable for a user-facing notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => "Please sign in to continue".to_string(),
            Self::InvalidArgument(msg) => msg.clone(),
            Self::NetworkFailure(_) => "Could not reach the store, please try again".to_string(),
            Self::ServerRejected { message, .. } => message.clone(),
            Self::MalformedResponse(_) | Self::Config(_) => "Something went wrong".to_string(),
            Self::CheckoutBlocked(blocker) => blocker.to_string(),
            Self::InvalidCredentials => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::NetworkFailure(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

fn status_label(status: Option<&u16>) -> String {
    status.map_or_else(|| "no status".to_string(), |s| format!("HTTP {s}"))
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_rejected_display() {
        let err = ClientError::rejected(Some(422), "Out of stock");
        assert_eq!(
            err.to_string(),
            "server rejected request (HTTP 422): Out of stock"
        );

        let err = ClientError::rejected(None, "Coupon expired");
        assert_eq!(
            err.to_string(),
            "server rejected request (no status): Coupon expired"
        );
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = ClientError::MalformedResponse("expected value at line 1".to_string());
        assert_eq!(err.user_message(), "Something went wrong");

        let err = ClientError::rejected(Some(400), "Invalid coupon");
        assert_eq!(err.user_message(), "Invalid coupon");
    }

    #[test]
    fn test_checkout_blocker_messages() {
        let err = ClientError::CheckoutBlocked(CheckoutBlocker::EmptyCart);
        assert_eq!(err.to_string(), "checkout blocked: cart is empty");
        assert!(ClientError::CheckoutBlocked(CheckoutBlocker::NotAuthenticated).is_auth());
        assert!(!err.is_auth());
    }
}
