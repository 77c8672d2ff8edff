//! Deterministic doubles for the effect traits.
//!
//! Available to this crate's tests and, through the `test-util` feature,
//! to downstream test suites.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::effects::{Clock, LoadingIndicator, Navigator, NoticeLevel, Notifier};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Recorders
// ---------------------------------------------------------------------------

/// A [`Notifier`] that keeps every notice. Handy in tests and for
/// surfaces that drain notices on their own schedule.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notice so far, oldest first.
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages of the notices at `level`.
    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}

/// A [`Navigator`] that keeps every requested route.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

/// A [`LoadingIndicator`] that keeps every visibility change.
#[derive(Debug, Default)]
pub struct RecordingLoadingIndicator {
    changes: Mutex<Vec<bool>>,
}

impl RecordingLoadingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> Vec<bool> {
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the last change left the indicator visible.
    pub fn is_visible(&self) -> bool {
        self.changes().last().copied().unwrap_or(false)
    }
}

impl LoadingIndicator for RecordingLoadingIndicator {
    fn set_visible(&self, visible: bool) {
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifier_helpers_route_to_levels() {
        let r = RecordingNotifier::new();
        r.error("e");
        r.success("s");
        r.info("i");
        assert_eq!(
            r.notices(),
            vec![
                (NoticeLevel::Error, "e".to_string()),
                (NoticeLevel::Success, "s".to_string()),
                (NoticeLevel::Info, "i".to_string()),
            ]
        );
    }

    #[test]
    fn test_recording_notifier_filters_by_level() {
        let r = RecordingNotifier::new();
        r.error("boom");
        r.info("fyi");
        assert_eq!(r.messages(NoticeLevel::Error), vec!["boom".to_string()]);
    }

    #[test]
    fn test_recording_loading_indicator_tracks_last_change() {
        let l = RecordingLoadingIndicator::new();
        assert!(!l.is_visible());
        l.set_visible(true);
        assert!(l.is_visible());
        l.set_visible(false);
        assert_eq!(l.changes(), vec![true, false]);
        assert!(!l.is_visible());
    }

    #[test]
    fn test_manual_clock_set_and_advance() {
        let c = ManualClock::new(1_000);
        assert_eq!(c.now_ms(), 1_000);
        c.advance_ms(500);
        assert_eq!(c.now_ms(), 1_500);
        c.set(10);
        assert_eq!(c.now_ms(), 10);
    }
}
