//! User-facing side effects: notifications, navigation, the loading
//! indicator, and the clock.
//!
//! The session layer never talks to a UI directly. It reports through
//! these small traits, which the application's composition root wires to
//! whatever surface it has (a toast widget, a router, a spinner). Tests
//! plug in the recording implementations behind the `test-util` feature.

use std::time::{SystemTime, UNIX_EPOCH};

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Shows short messages to the user ("toasts").
pub trait Notifier: Send + Sync + 'static {
    /// Displays `message` at the given level.
    fn notify(&self, level: NoticeLevel, message: &str);

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn info(&self, message: &str) {
        self.notify(NoticeLevel::Info, message);
    }
}

/// A [`Notifier`] that writes notices to the log. Used when no UI is
/// attached (the demo binary, headless tools).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Error => tracing::error!(notice = message, "user notice"),
            NoticeLevel::Success | NoticeLevel::Info => {
                tracing::info!(?level, notice = message, "user notice")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

/// Moves the user to another route.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, path: &str);
}

/// A [`Navigator`] that only logs the requested route.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "navigation requested");
    }
}

// ---------------------------------------------------------------------------
// Loading indicator
// ---------------------------------------------------------------------------

/// A global "request in progress" indicator.
pub trait LoadingIndicator: Send + Sync + 'static {
    fn set_visible(&self, visible: bool);
}

/// An indicator with nothing to show.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLoadingIndicator;

impl LoadingIndicator for NoLoadingIndicator {
    fn set_visible(&self, _visible: bool) {}
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Wall-clock source in Unix epoch milliseconds.
///
/// Token expiry is an absolute wall-clock instant (it is persisted and
/// compared across restarts), so the session uses this instead of Tokio's
/// monotonic clock. Timer *delays* still run on Tokio time.
pub trait Clock: Send + Sync + 'static {
    fn now_ms(&self) -> i64;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}
