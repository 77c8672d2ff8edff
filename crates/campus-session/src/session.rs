//! Session configuration and lifecycle state.

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the portal API, without a trailing slash
    /// (e.g. `https://portal.example.edu/api`).
    pub api_url: String,

    /// Path of the refresh endpoint, appended to `api_url`.
    pub refresh_path: String,

    /// How long before expiry the refresh fires. Default: 60 seconds.
    pub refresh_lead: Duration,

    /// Route the user is sent to when the session cannot be renewed.
    pub login_route: String,

    /// Notice shown when a refresh fails.
    pub refresh_failed_notice: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api".to_string(),
            refresh_path: "/refresh".to_string(),
            refresh_lead: Duration::from_secs(60),
            login_route: "/login".to_string(),
            refresh_failed_notice: "Failed to refresh token. Please log in again.".to_string(),
        }
    }
}

impl SessionConfig {
    /// Default settings against the given API base URL.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Full URL of the refresh endpoint.
    pub fn refresh_url(&self) -> String {
        format!("{}{}", self.api_url, self.refresh_path)
    }

    /// Delay from `now_ms` until a refresh should fire for a token that
    /// expires at `expires_at_ms`.
    ///
    /// `None` when that moment is already here or past: no timer is
    /// scheduled and the token is left to expire on its own.
    pub fn refresh_delay(&self, now_ms: i64, expires_at_ms: i64) -> Option<Duration> {
        let lead_ms = i64::try_from(self.refresh_lead.as_millis()).unwrap_or(i64::MAX);
        let delay_ms = expires_at_ms.saturating_sub(now_ms).saturating_sub(lead_ms);
        (delay_ms > 0).then(|| Duration::from_millis(delay_ms as u64))
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle state of the session.
///
/// ```text
///                 set_token / establish
///  Unauthenticated ───────────────────▶ Authenticated
///        ▲                               │       ▲
///        │ refresh failed                │ timer │ refresh ok
///        │                               ▼       │
///        └─────────────────────────── RefreshPending
/// ```
///
/// `Unauthenticated` after a failed refresh is terminal until the next
/// explicit login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No bearer token.
    Unauthenticated,
    /// A bearer token is installed.
    Authenticated,
    /// A refresh request is in flight.
    RefreshPending,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Unauthenticated"),
            Self::Authenticated => write!(f, "Authenticated"),
            Self::RefreshPending => write!(f, "RefreshPending"),
        }
    }
}
