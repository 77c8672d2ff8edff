//! Error types for the session layer.

use campus_protocol::ProtocolError;
use campus_transport::TransportError;

/// Errors that can occur while managing the bearer-token session.
///
/// Every refresh failure except [`Superseded`](Self::Superseded) is
/// terminal: by the time a caller sees one of these from
/// [`SessionManager::refresh`](crate::SessionManager::refresh) the session
/// has already been cleared and the user sent to login.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No refresh credential is persisted, so a new bearer token cannot be
    /// minted without the user logging in again.
    #[error("no refresh credential found")]
    NoRefreshCredential,

    /// The refresh endpoint answered, but not with a usable grant
    /// (non-2xx status, `status: false`, or no `data`).
    #[error("token refresh rejected: {0}")]
    RefreshRejected(String),

    /// The refresh request never completed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The refresh response could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session was replaced (login, logout, new token) while the
    /// refresh was in flight. Its outcome was discarded and the newer
    /// session left untouched.
    #[error("session changed while the token refresh was in flight")]
    Superseded,

    /// Reading or writing persisted credentials failed.
    #[error("credential storage failed: {0}")]
    Storage(String),
}
