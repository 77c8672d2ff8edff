//! Codec trait and the JSON implementation.
//!
//! A "codec" converts between Rust types and raw bytes. The client and
//! session layers never call `serde_json` directly for request and
//! response bodies; they go through a [`Codec`] so tests (and a future
//! binary format) can swap it out.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because a codec lives inside long-lived,
/// shared clients that Tokio may poll from any worker thread.
pub trait Codec: Send + Sync + 'static {
    /// Content type advertised on request bodies.
    fn content_type(&self) -> &'static str;

    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`). The portal backend only
/// speaks JSON, so this is the codec every default constructor picks.
///
/// ```rust
/// use campus_protocol::{Codec, Envelope, JsonCodec};
///
/// let codec = JsonCodec;
/// let env: Envelope<u32> = codec.decode(br#"{"status":true,"data":7}"#).unwrap();
/// assert!(env.status);
/// assert_eq!(env.data, Some(7));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(|e| ProtocolError::Decode(e.to_string()))
    }
}
