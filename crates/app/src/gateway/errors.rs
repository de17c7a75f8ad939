//! Gateway errors.

use thiserror::Error;

/// Failure of a cart request against the backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport failure: connection, timeout, TLS.
    #[error("cart request failed")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the bearer credential.
    #[error("session is no longer valid")]
    Unauthorized,

    /// The backend answered with a non-success status.
    #[error("backend rejected cart request with status {status}")]
    Backend {
        /// HTTP status code.
        status: u16,

        /// Human-readable message extracted from the payload, if any.
        message: Option<String>,

        /// Raw response payload.
        body: String,
    },

    /// The backend answered with a body that is not a cart snapshot.
    #[error("invalid cart response")]
    Decode(#[source] serde_json::Error),
}

impl GatewayError {
    /// The backend's own message, when it sent one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Backend {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }

    /// Builds a backend error from a status and raw payload.
    ///
    /// The message is taken from a JSON `message` or `error` field if the
    /// payload has one.
    pub fn backend(status: u16, body: String) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                ["message", "error"]
                    .into_iter()
                    .find_map(|key| value.get(key).and_then(|field| field.as_str()))
                    .map(str::to_string)
            })
            .filter(|message| !message.trim().is_empty());

        Self::Backend {
            status,
            message,
            body,
        }
    }
}
