//! Single-slot timers and trailing-edge debouncing for campus.
//!
//! Two tools, both built on Tokio's timer wheel:
//!
//! - [`TimerSlot`]: holds **at most one** scheduled task. Scheduling a new
//!   task cancels whatever was pending. The session layer uses one slot for
//!   its token refresh.
//! - [`Debouncer`]: a `TimerSlot` with a fixed quiet window. A burst of
//!   calls collapses into a single run, fired `window` after the last call.
//!   The list controller uses one per listing.
//!
//! # Detached execution
//!
//! When a slot's delay elapses, the scheduled future is handed to a fresh
//! Tokio task and the slot becomes idle. Cancelling or re-scheduling the
//! slot afterwards therefore never aborts work that has already started:
//!
//! ```text
//!   schedule(d, work) ──sleep(d)──▶ spawn(work) ──▶ slot idle
//!         │                              │
//!   cancel()/schedule() here aborts      cancel() here is a no-op;
//!   the pending sleep                    `work` runs to completion
//! ```
//!
//! All scheduling calls must happen inside a Tokio runtime.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// TimerSlot
// ---------------------------------------------------------------------------

/// A timer that can hold one pending task at a time.
///
/// Dropping the slot cancels the pending task.
#[derive(Debug)]
pub struct TimerSlot {
    label: &'static str,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    handle: JoinHandle<()>,
    deadline: Instant,
}

impl TimerSlot {
    /// Creates an idle slot. `label` only shows up in logs.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            pending: None,
        }
    }

    /// Schedules `task` to start after `delay`, cancelling any task that
    /// is still waiting in this slot.
    pub fn schedule<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let replaced = self.cancel();
        let label = self.label;
        let deadline = Instant::now() + delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            trace!(label, "timer fired");
            tokio::spawn(task);
        });

        debug!(
            label,
            delay_ms = delay.as_millis() as u64,
            replaced,
            "timer scheduled"
        );
        self.pending = Some(Pending { handle, deadline });
    }

    /// Cancels the pending task, if any.
    ///
    /// Returns `true` if a task was still waiting and has been dropped.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(p) if !p.handle.is_finished() => {
                p.handle.abort();
                trace!(label = self.label, "timer cancelled");
                true
            }
            _ => false,
        }
    }

    /// Whether a task is still waiting for its delay to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// When the pending task will start, or `None` if idle.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
            .as_ref()
            .filter(|p| !p.handle.is_finished())
            .map(|p| p.deadline)
    }

    /// Time left until the pending task starts, or `None` if idle.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        if let Some(p) = self.pending.take() {
            p.handle.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

/// Trailing-edge debouncer.
///
/// Every [`call`](Self::call) restarts the quiet window; only the task
/// passed to the last call runs, once the window elapses without another
/// call. This is debouncing, not throttling: a steady stream of calls
/// closer together than `window` postpones the run indefinitely.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    slot: TimerSlot,
    collapsed: u64,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet window.
    pub fn new(label: &'static str, window: Duration) -> Self {
        Self {
            window,
            slot: TimerSlot::new(label),
            collapsed: 0,
        }
    }

    /// Restarts the quiet window with `task` as the one to run.
    pub fn call<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.slot.is_pending() {
            self.collapsed += 1;
        }
        self.slot.schedule(self.window, task);
    }

    /// Drops the pending run, if any.
    pub fn cancel(&mut self) -> bool {
        self.slot.cancel()
    }

    /// Whether a run is waiting for the window to elapse.
    pub fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }

    /// The configured quiet window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// How many calls were superseded by a later call before firing.
    pub fn collapsed(&self) -> u64 {
        self.collapsed
    }
}
