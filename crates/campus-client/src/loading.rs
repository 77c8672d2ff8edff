use std::sync::Arc;

use campus_session::LoadingIndicator;

/// Shows the loading indicator for as long as it is alive.
///
/// Dropping the guard hides the indicator, so every exit path of a
/// request (success, error, `?`, a cancelled future) ends with the
/// indicator hidden.
pub struct LoadingGuard {
    indicator: Arc<dyn LoadingIndicator>,
}

impl LoadingGuard {
    pub fn show(indicator: Arc<dyn LoadingIndicator>) -> Self {
        indicator.set_visible(true);
        Self { indicator }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.indicator.set_visible(false);
    }
}
