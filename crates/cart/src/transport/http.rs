//! `reqwest` implementation of [`Transport`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use super::{ApiRequest, Transport, open_envelope};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::SessionStore;

/// Header carrying a per-request correlation ID.
const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// HTTP transport for the storefront REST API.
#[derive(Clone)]
pub struct HttpTransport {
    inner: Arc<HttpTransportInner>,
}

struct HttpTransportInner {
    client: reqwest::Client,
    base_url: Url,
    session: SessionStore,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport bound to `session`.
    ///
    /// # Errors
    ///
    /// Returns `NetworkFailure` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpTransportInner {
                client,
                base_url: with_trailing_slash(config.api_url.clone()),
                session,
            }),
        })
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidArgument(format!("bad API path {path}: {e}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(
        skip(self, request),
        fields(method = %request.method, path = %request.path, request_id = tracing::field::Empty)
    )]
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>> {
        let token = if request.authenticated {
            Some(
                self.inner
                    .session
                    .bearer_token()
                    .ok_or(ClientError::AuthRequired)?,
            )
        } else {
            None
        };

        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let url = self.url_for(&request.path)?;
        let mut builder = self
            .inner
            .client
            .request(request.method, url)
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(token) = &token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && request.authenticated {
            self.inner.session.expire();
            return Err(ClientError::AuthRequired);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::NetworkFailure(e.to_string()))?;
        debug!(status = %status, bytes = body.len(), "API response received");

        open_envelope(status, &body)
    }
}

/// `Url::join` drops the last segment of a base without a trailing slash.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
