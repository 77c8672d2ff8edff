//! Error types for the protocol layer.
//!
//! Each campus crate defines its own error enum. A `ProtocolError` always
//! means the bytes on the wire did not match the shape we expected, never
//! that the network failed.

/// Errors that can occur while encoding or decoding API payloads.
///
/// Messages are rendered eagerly so the error stays `Clone`; list
/// controllers keep their last error in state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into a request body).
    #[error("encode failed: {0}")]
    Encode(String),

    /// Deserialization failed: malformed JSON, missing required fields,
    /// or wrong data types.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The payload decoded but violates an API rule, e.g. a token grant
    /// with an empty access token.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
