//! Transport adapter between the clients and the storefront REST API.
//!
//! # Architecture
//!
//! - [`Transport`] is the capability the cart, auth and catalog clients are
//!   parameterized by. It sends one [`ApiRequest`] and returns the
//!   envelope's `data` field.
//! - [`HttpTransport`] is the `reqwest` implementation: bearer auth from the
//!   [`SessionStore`](crate::session::SessionStore), forced logout on 401,
//!   uniform errors for non-2xx statuses and `success: false` envelopes.
//!
//! Nothing here retries. A failed request is reported once and the caller
//! decides what to do.

mod envelope;
mod http;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, Result};

pub use envelope::{Envelope, open_envelope};
pub use http::HttpTransport;

/// One call against the REST API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Whether the request needs the bearer token.
    pub authenticated: bool,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            authenticated: true,
        }
    }

    /// Authenticated `GET`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Authenticated `POST`.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Authenticated `PUT`.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Authenticated `DELETE`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Send without credentials (login, health, catalog).
    #[must_use]
    pub const fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Sends API requests on behalf of the clients.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the envelope's `data`.
    ///
    /// # Errors
    ///
    /// - `AuthRequired` for an authenticated request without a session, or
    ///   after the server answered 401.
    /// - `NetworkFailure` when no response was received.
    /// - `ServerRejected` for non-2xx statuses and `success: false`.
    /// - `MalformedResponse` when the body is not an envelope.
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>>;
}

/// Decode the `data` of a response that must carry one.
///
/// # Errors
///
/// Returns `MalformedResponse` when `data` is missing or has the wrong shape.
pub fn decode_data<T: DeserializeOwned>(data: Option<Value>, what: &str) -> Result<T> {
    let data =
        data.ok_or_else(|| ClientError::MalformedResponse(format!("response has no {what}")))?;
    serde_json::from_value(data).map_err(|e| ClientError::MalformedResponse(format!("{what}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use shopfront_core::Cart;

    use super::*;

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::post("/cart/add").json(json!({"productId": 1, "quantity": 2}));
        assert_eq!(request.method, Method::POST);
        assert!(request.authenticated);
        assert!(request.body.is_some());

        let request = ApiRequest::get("/health").anonymous();
        assert!(!request.authenticated);
    }

    #[test]
    fn test_decode_data_requires_payload() {
        let err = decode_data::<Cart>(None, "cart").unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(msg) if msg.contains("cart")));
    }

    #[test]
    fn test_decode_data_reports_shape_errors() {
        let err = decode_data::<Cart>(Some(json!({"items": "nope"})), "cart").unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));

        let cart = decode_data::<Cart>(Some(json!({"items": []})), "cart").unwrap();
        assert!(cart.is_empty());
    }
}
