//! Bearer-token session management for campus.
//!
//! This crate owns the one piece of mutable authentication state in the
//! workspace: the current bearer token and its expiry. It knows how to:
//!
//! - restore a session from persisted credentials ([`CredentialStore`]);
//! - keep exactly one refresh timer armed, firing a minute before expiry;
//! - renew the token against `POST /refresh` and persist the new grant;
//! - end the session cleanly when renewal fails.
//!
//! User-facing effects (toasts, redirects, the loading spinner) go through
//! the small traits in [`effects`](crate::Notifier) so the crate stays
//! headless.
//!
//! ```text
//!  CredentialStore ──load──▶ SessionManager ──token()──▶ ApiClient
//!        ▲                        │   ▲
//!        └──────save/clear────────┘   │ TimerSlot (refresh_lead before expiry)
//!                                     └──────────── refresh() ──▶ Transport
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod effects;
mod error;
mod manager;
mod session;
mod store;
#[cfg(any(test, feature = "test-util"))]
mod testing;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use effects::{
    Clock, LoadingIndicator, Navigator, NoLoadingIndicator, NoticeLevel, Notifier, SystemClock,
    TracingNavigator, TracingNotifier,
};
pub use error::SessionError;
pub use manager::{SessionManager, SessionManagerBuilder};
pub use session::{SessionConfig, SessionState};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredCredentials};
#[cfg(any(test, feature = "test-util"))]
pub use testing::{
    ManualClock, RecordingLoadingIndicator, RecordingNavigator, RecordingNotifier,
};
