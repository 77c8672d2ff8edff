//! Error types for the API client.

use campus_protocol::ProtocolError;
use campus_transport::TransportError;
use serde_json::Value;

/// Everything a single API call can fail with.
///
/// By the time a caller receives one of these the user has already been
/// notified; the error is returned so the caller can recover locally
/// (keep a form open, leave a list untouched).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// The request never completed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The backend rejected the input (HTTP 422).
    #[error("validation failed: {message}")]
    Validation {
        /// The first message found in `errors`.
        message: String,
        /// The raw `errors` value, for per-field display.
        errors: Value,
    },

    /// Any other non-2xx response.
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    /// The body could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A 2xx response with no body where one was required.
    #[error("empty response body")]
    EmptyResponse,
}

impl ClientError {
    /// HTTP status, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation { .. } => Some(422),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
