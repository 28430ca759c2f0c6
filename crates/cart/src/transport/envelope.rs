//! The `{ success, data?, message? }` response wrapper.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::error::{ClientError, Result};

/// Longest slice of a raw body quoted in errors and logs.
const BODY_SNIPPET_LEN: usize = 200;

/// Response envelope used by every backend endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Successful envelope with no payload.
    pub const fn empty() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
        }
    }

    /// Failed envelope.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Turn a status and raw body into the envelope's `data`.
///
/// A 2xx with an empty body is a success with no data. Any non-2xx, and any
/// envelope with `success: false`, becomes `ServerRejected` carrying the
/// server's message when it sent one.
///
/// # Errors
///
/// `ServerRejected` or `MalformedResponse` as described above.
pub fn open_envelope(status: StatusCode, body: &str) -> Result<Option<Value>> {
    let parsed = if body.trim().is_empty() {
        None
    } else {
        Some(serde_json::from_str::<Envelope>(body))
    };

    if !status.is_success() {
        error!(
            status = %status,
            body = %snippet(body),
            "API returned non-success status"
        );
        let message = match parsed {
            Some(Ok(Envelope {
                message: Some(message),
                ..
            })) => message,
            _ if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
            _ => snippet(body),
        };
        return Err(ClientError::rejected(Some(status.as_u16()), message));
    }

    match parsed {
        None => Ok(None),
        Some(Ok(envelope)) if envelope.success => Ok(envelope.data),
        Some(Ok(envelope)) => Err(ClientError::rejected(
            Some(status.as_u16()),
            envelope
                .message
                .unwrap_or_else(|| "request was not successful".to_string()),
        )),
        Some(Err(e)) => {
            error!(
                error = %e,
                body = %snippet(body),
                "Failed to parse API envelope"
            );
            Err(ClientError::MalformedResponse(e.to_string()))
        }
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_LEN).collect()
}
