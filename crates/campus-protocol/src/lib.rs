//! Wire protocol for campus.
//!
//! This crate defines the shapes the portal backend speaks:
//!
//! - **Types** ([`Envelope`], [`Page`], [`TokenGrant`], [`ErrorBody`]):
//!   the JSON structures that travel over HTTP.
//! - **Params** ([`ParamValue`], [`Filters`]): list filters and the
//!   blank-dropping query rule.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how bodies become bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while encoding or
//!   decoding.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope<T>) → Client / Session / List
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod params;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use params::{Filters, ParamValue, has_meaningful, query_pairs};
pub use types::{
    Envelope, ErrorBody, Page, RefreshRequest, TokenGrant, coerce_rows,
    first_error_message, is_truthy,
};
