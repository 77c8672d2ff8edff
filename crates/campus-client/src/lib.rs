//! Authenticated API client for campus.
//!
//! [`ApiClient`] is the only way the rest of the workspace talks to the
//! portal backend. It:
//!
//! - attaches `Authorization: Bearer <token>` from the [`SessionManager`]
//!   when a token is present;
//! - shows the loading indicator for the duration of each call (unless
//!   the call is [`quiet`](RequestOptions::quiet));
//! - turns failures into a [`ClientError`] *and* a user notice, so callers
//!   only handle the error when they want to recover locally.
//!
//! [`SessionManager`]: campus_session::SessionManager

mod client;
mod error;
mod loading;

pub use client::{
    ApiClient, ApiClientBuilder, GENERIC_FAILURE_NOTICE, RequestOptions,
    VALIDATION_FALLBACK_NOTICE,
};
pub use error::ClientError;
pub use loading::LoadingGuard;
