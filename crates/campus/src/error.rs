//! Unified error type for campus.

use campus_client::ClientError;
use campus_list::ListError;
use campus_protocol::ProtocolError;
use campus_session::SessionError;
use campus_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `campus` meta-crate you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant lets `?` convert sub-crate errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CampusError {
    /// A transport-level error (connect, timeout, body).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (refresh, storage).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An API call failed (validation, HTTP status).
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A list fetch failed.
    #[error(transparent)]
    List(#[from] ListError),

    /// Configuration could not be read.
    #[error("invalid configuration: {0}")]
    Config(String),
}
