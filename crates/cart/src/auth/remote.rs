//! Login against the backend's auth endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use shopfront_core::Email;
use tracing::{debug, instrument};

use super::SessionResolver;
use crate::error::{ClientError, Result};
use crate::session::{Session, SessionUser};
use crate::transport::{ApiRequest, Transport, decode_data};

const LOGIN_PATH: &str = "/auth/login";
const HEALTH_PATH: &str = "/health";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    user: SessionUser,
    /// Token lifetime in seconds.
    #[serde(default)]
    expires_in: Option<i64>,
}

impl LoginResponse {
    fn into_session(self) -> Result<Session> {
        let session = Session::new(SecretString::from(self.token)).with_user(self.user);
        let Some(secs) = self.expires_in else {
            return Ok(session);
        };
        let expires_at = Duration::try_seconds(secs)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                ClientError::MalformedResponse(format!("expiresIn out of range: {secs}"))
            })?;
        Ok(session.with_expiry(expires_at))
    }
}

/// Resolves sessions with `POST /auth/login`.
pub struct RemoteResolver {
    transport: Arc<dyn Transport>,
}

impl RemoteResolver {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl SessionResolver for RemoteResolver {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: &Email, password: &SecretString) -> Result<Session> {
        let request = ApiRequest::post(LOGIN_PATH)
            .json(json!({
                "email": email.as_str(),
                "password": password.expose_secret(),
            }))
            .anonymous();

        let data = self.transport.send(request).await?;
        let response: LoginResponse = decode_data(data, "login response")?;
        response.into_session()
    }

    /// `GET /health`. The backend counts as down when the probe gets no
    /// response or a 5xx; any other answer means it is up.
    async fn is_available(&self) -> bool {
        match self.transport.send(ApiRequest::get(HEALTH_PATH).anonymous()).await {
            Ok(_) => true,
            Err(ClientError::NetworkFailure(reason)) => {
                debug!(reason, "Auth backend unreachable");
                false
            }
            Err(ClientError::ServerRejected { status, .. }) => {
                status.is_some_and(|status| status < 500)
            }
            Err(_) => true,
        }
    }
}
